//! Command implementations for Augcache CLI

pub mod config;
pub mod run;

use anyhow::Result;

/// Trait for CLI command execution
pub trait Command {
    /// Execute the command
    fn execute(&self, config: &crate::config::Config, json_output: bool) -> Result<()>;
}
