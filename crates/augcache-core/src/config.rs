//! Configuration for augmentation caches

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{AugmentError, Result};

/// Largest seed that survives a TOML round-trip
pub const MAX_SEED: u64 = i64::MAX as u64;

/// Reload policy of an augmentation cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Number of raw samples drawn from each producer per reload
    pub load_size: usize,

    /// Number of `update()` calls served from one pool before it is replaced
    pub updates_per_reload: usize,

    /// Seed for the slot-selection RNG; entropy-seeded when absent.
    /// At most `i64::MAX` so it can be written back as a TOML integer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            load_size: 1,
            updates_per_reload: 2,
            seed: None,
        }
    }
}

impl CacheConfig {
    pub fn new(load_size: usize, updates_per_reload: usize) -> Self {
        Self {
            load_size,
            updates_per_reload,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the reload policy before any producer is touched
    pub fn validate(&self) -> Result<()> {
        if self.load_size < 1 {
            return Err(AugmentError::invalid_field(
                "CONFIG_LOAD_SIZE_ZERO",
                "load_size must be at least 1",
                format!("Cache configured with load_size = {}", self.load_size),
                "Use a load_size of 1 or more; each reload draws that many samples per producer",
                "load_size",
            ));
        }

        if self.updates_per_reload < 1 {
            return Err(AugmentError::invalid_field(
                "CONFIG_UPDATES_PER_RELOAD_ZERO",
                "updates_per_reload must be at least 1",
                format!(
                    "Cache configured with updates_per_reload = {}",
                    self.updates_per_reload
                ),
                "Use 1 to reload on every update, or a larger value to replay each pool longer",
                "updates_per_reload",
            ));
        }

        if let Some(seed) = self.seed.filter(|&seed| seed > MAX_SEED) {
            return Err(AugmentError::invalid_field(
                "CONFIG_SEED_OUT_OF_RANGE",
                format!("seed must be at most {}", MAX_SEED),
                format!("Cache configured with seed = {}", seed),
                "TOML integers are signed 64-bit; pick a seed no larger than i64::MAX",
                "seed",
            ));
        }

        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CacheConfig = toml::from_str(content).map_err(|e| AugmentError::Parse {
            code: "CONFIG_TOML_INVALID",
            message: e.to_string(),
            context: "Parsing cache configuration".to_string(),
            suggestion: "Expected keys: load_size, updates_per_reload and optional seed"
                .to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match AugmentError::from(e) {
            AugmentError::Io {
                code,
                message,
                suggestion,
                source,
                ..
            } => AugmentError::Io {
                code,
                message,
                path: Some(path.to_path_buf()),
                suggestion,
                source,
            },
            other => other,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AugmentError::Parse {
            code: "CONFIG_TOML_ENCODE",
            message: e.to_string(),
            context: "Serializing cache configuration".to_string(),
            suggestion: "Report this as a bug".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(CacheConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let error = CacheConfig::new(0, 3).validate().unwrap_err();
        assert_eq!(error.code(), "CONFIG_LOAD_SIZE_ZERO");

        let error = CacheConfig::new(3, 0).validate().unwrap_err();
        assert_eq!(error.code(), "CONFIG_UPDATES_PER_RELOAD_ZERO");
    }

    #[test]
    fn test_toml_roundtrip_keeps_seed() {
        let config = CacheConfig::new(4, 8).with_seed(7);
        let text = config.to_toml_string().unwrap();
        assert_eq!(CacheConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_toml_without_seed() {
        let config = CacheConfig::from_toml_str("load_size = 2\nupdates_per_reload = 5\n").unwrap();
        assert_eq!(config, CacheConfig::new(2, 5));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CacheConfig::from_toml_str("load_size = 6\n").unwrap();
        assert_eq!(config, CacheConfig::new(6, 2));

        let config = CacheConfig::from_toml_str("").unwrap();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_seed_beyond_toml_range_rejected() {
        let error = CacheConfig::default().with_seed(u64::MAX).validate().unwrap_err();
        assert_eq!(error.code(), "CONFIG_SEED_OUT_OF_RANGE");

        let config = CacheConfig::default().with_seed(MAX_SEED);
        assert!(config.validate().is_ok());
        let text = config.to_toml_string().unwrap();
        assert_eq!(CacheConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_toml_invalid_values() {
        let error =
            CacheConfig::from_toml_str("load_size = 0\nupdates_per_reload = 5\n").unwrap_err();
        assert!(error.is_config());

        let error = CacheConfig::from_toml_str("load_size = \"many\"").unwrap_err();
        assert_eq!(error.code(), "CONFIG_TOML_INVALID");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "load_size = 3\nupdates_per_reload = 1\nseed = 11").unwrap();

        let config = CacheConfig::from_file(file.path()).unwrap();
        assert_eq!(config, CacheConfig::new(3, 1).with_seed(11));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let error = CacheConfig::from_file("/nonexistent/augcache.toml").unwrap_err();
        match error {
            AugmentError::Io { code, path, .. } => {
                assert_eq!(code, "IO_FILE_NOT_FOUND");
                assert!(path.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
