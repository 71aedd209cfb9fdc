//! Augcache CLI - drive an augmentation cache from the command line
//!
//! Runs a replay cache against a synthetic upstream producer and reports how
//! many upstream calls the reload policy saved.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod augmentations;
mod commands;
mod config;
mod synthetic;
mod utils;

use commands::{config::ConfigCommand, run::RunCommand, Command};

#[derive(Parser)]
#[command(
    name = "augcache",
    version = env!("CARGO_PKG_VERSION"),
    about = "Augmentation replay cache driver",
    long_about = "Drives an augmentation cache against a synthetic image producer and reports reload and amortization statistics."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "AUGCACHE_CONFIG")]
    config: Option<PathBuf>,

    /// JSON output format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay synthetic samples through a cache
    #[command(name = "run", alias = "r")]
    Run(RunCommand),

    /// Show or write the effective configuration
    #[command(name = "config", alias = "c")]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    debug!("Augcache CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = config::Config::load(cli.config.as_deref()).and_then(|config| {
        debug!("Configuration loaded: {:?}", config);
        match &cli.command {
            Commands::Run(cmd) => cmd.execute(&config, cli.json),
            Commands::Config(cmd) => cmd.execute(&config, cli.json),
        }
    });

    match result {
        Ok(()) => {
            if !cli.quiet {
                info!("Command completed successfully");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    Ok(())
}
