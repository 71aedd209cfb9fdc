//! Config command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::commands::Command;
use crate::config::Config;
use crate::utils::print_output;

#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Write the effective configuration to this path
    #[arg(long)]
    pub write: Option<PathBuf>,

    /// Print the path of the default configuration file and exit
    #[arg(long)]
    pub path: bool,
}

impl Command for ConfigCommand {
    fn execute(&self, config: &Config, json_output: bool) -> Result<()> {
        if self.path {
            println!("{}", Config::default_config_path().display());
            return Ok(());
        }

        config.cache.validate().context("Invalid [cache] section")?;

        if let Some(path) = &self.write {
            config.save(path)?;
            info!("Wrote configuration to {}", path.display());
        }

        if json_output {
            print_output(&serde_json::to_value(config)?, true)
        } else {
            let text = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
            print!("{}", text);
            Ok(())
        }
    }
}
