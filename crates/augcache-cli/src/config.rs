//! Configuration management for Augcache CLI

use anyhow::{Context, Result};
use augcache_core::CacheConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::augmentations::AugmentationKind;

/// CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reload policy of the cache
    pub cache: CacheConfig,

    /// Synthetic upstream producer settings
    pub synthetic: SyntheticConfig,

    /// Run defaults
    pub run: RunConfig,
}

/// Synthetic producer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Image height in pixels
    pub height: usize,

    /// Image width in pixels
    pub width: usize,

    /// Number of Gaussian spots per image
    pub particles: usize,

    /// Spot radius (standard deviation, pixels)
    pub sigma: f64,

    /// Artificial delay per produced sample, standing in for simulation cost
    pub latency_ms: u64,

    /// Seed for spot placement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of update + resolve steps
    pub steps: usize,

    /// Augmentation applied to cached samples
    pub augmentation: AugmentationKind,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            height: 64,
            width: 64,
            particles: 3,
            sigma: 2.0,
            latency_ms: 0,
            seed: None,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: 100,
            augmentation: AugmentationKind::Mirror,
        }
    }
}

impl Config {
    /// Load configuration from file, or fall back to defaults
    ///
    /// An explicitly given path must exist; the default path may be absent.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let (config_path, explicit) = match config_path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        if !config_path.exists() {
            if explicit {
                anyhow::bail!("Config file not found: {}", config_path.display());
            }
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config
            .cache
            .validate()
            .with_context(|| format!("Invalid [cache] section in {}", config_path.display()))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".config"))
            .join("augcache")
            .join("config.toml")
    }
}
