//! Augcache Core - replay cache for expensive image producers
//!
//! This crate provides a cache that sits between an expensive upstream
//! producer of `(image, properties)` samples and a family of cheap
//! augmentations applied to its output. A small pool of raw samples is drawn
//! from the producer, replayed through the augmentation hooks for a fixed
//! number of updates, and then replaced wholesale.
//!
//! # Example
//!
//! ```rust
//! use augcache_core::prelude::*;
//! use ndarray::ArrayD;
//!
//! let producer = producer_fn(|| {
//!     Ok(Sample::new(ArrayD::zeros(vec![4, 4]), Properties::default()))
//! });
//! let invert = Augmentation::new("invert", |image: &Image, n| {
//!     Ok(if n % 2 == 1 { image.mapv(|v| -v) } else { image.clone() })
//! });
//!
//! let mut cache = AugmentationCache::new(producer, CacheConfig::new(2, 2), invert)?;
//! let first = cache.resolve()?;
//! let second = cache.next_sample()?;
//! assert_eq!(first.image.shape(), second.image.shape());
//! # Ok::<(), augcache_core::AugmentError>(())
//! ```

// Module declarations
pub mod augmentation;
pub mod batched;
pub mod cache;
pub mod config;
pub mod pool;
pub mod producer;
pub mod sample;
pub mod shared;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AugmentError {
    /// Invalid construction parameters
    #[error("Configuration error [{code}]: {message}\nContext: {context}\nSuggestion: {suggestion}")]
    Configuration {
        code: &'static str,
        message: String,
        context: String,
        suggestion: String,
        field_name: Option<String>,
    },

    /// Upstream producer failure while filling a pool
    #[error("Upstream error [{code}]: {message}\nContext: {context}\nSuggestion: {suggestion}")]
    Upstream {
        code: &'static str,
        message: String,
        context: String,
        suggestion: String,
        producer_index: Option<usize>,
        #[source]
        source: anyhow::Error,
    },

    /// Augmentation hook failure while resolving a sample
    #[error("Transform error [{code}]: {message}\nContext: {context}\nSuggestion: {suggestion}")]
    Transform {
        code: &'static str,
        message: String,
        context: String,
        suggestion: String,
        augmentation: String,
        replay_index: usize,
        pool_index: Option<usize>,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration file could not be read
    #[error("IO error [{code}]: {message}\nPath: {path:?}\nSuggestion: {suggestion}")]
    Io {
        code: &'static str,
        message: String,
        path: Option<std::path::PathBuf>,
        suggestion: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration text could not be decoded or encoded
    #[error("Parse error [{code}]: {message}\nContext: {context}\nSuggestion: {suggestion}")]
    Parse {
        code: &'static str,
        message: String,
        context: String,
        suggestion: String,
    },
}

pub type Result<T> = std::result::Result<T, AugmentError>;

impl AugmentError {
    /// Create a configuration error
    pub fn configuration<S1, S2, S3>(
        code: &'static str,
        message: S1,
        context: S2,
        suggestion: S3,
    ) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::Configuration {
            code,
            message: message.into(),
            context: context.into(),
            suggestion: suggestion.into(),
            field_name: None,
        }
    }

    /// Create a configuration error naming the offending field
    pub fn invalid_field<S1, S2, S3, S4>(
        code: &'static str,
        message: S1,
        context: S2,
        suggestion: S3,
        field_name: S4,
    ) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
        S4: Into<String>,
    {
        Self::Configuration {
            code,
            message: message.into(),
            context: context.into(),
            suggestion: suggestion.into(),
            field_name: Some(field_name.into()),
        }
    }

    /// Wrap a producer failure
    pub fn upstream<S: Into<String>>(
        context: S,
        producer_index: Option<usize>,
        source: anyhow::Error,
    ) -> Self {
        Self::Upstream {
            code: "UPSTREAM_PRODUCE_FAILED",
            message: format!("Upstream producer failed: {}", source),
            context: context.into(),
            suggestion: "Fix the producer fault and call update() or reload() again; the previous pool is still active"
                .to_string(),
            producer_index,
            source,
        }
    }

    /// Wrap an augmentation hook failure
    pub fn transform<S1, S2>(
        code: &'static str,
        augmentation: S1,
        context: S2,
        replay_index: usize,
        source: anyhow::Error,
    ) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let augmentation = augmentation.into();
        Self::Transform {
            code,
            message: format!(
                "Augmentation '{}' failed at replay index {}: {}",
                augmentation, replay_index, source
            ),
            context: context.into(),
            suggestion: "Cache state is unchanged; clear the hook fault and resolve() again"
                .to_string(),
            augmentation,
            replay_index,
            pool_index: None,
            source,
        }
    }

    /// Attach the index of the paired pool a transform error came from
    pub fn with_pool_index(mut self, index: usize) -> Self {
        if let Self::Transform { pool_index, .. } = &mut self {
            *pool_index = Some(index);
        }
        self
    }

    /// Get the error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration { code, .. } => code,
            Self::Upstream { code, .. } => code,
            Self::Transform { code, .. } => code,
            Self::Io { code, .. } => code,
            Self::Parse { code, .. } => code,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    pub fn is_transform(&self) -> bool {
        matches!(self, Self::Transform { .. })
    }
}

impl From<std::io::Error> for AugmentError {
    fn from(err: std::io::Error) -> Self {
        let (code, suggestion) = match err.kind() {
            std::io::ErrorKind::NotFound => (
                "IO_FILE_NOT_FOUND",
                "Check that the configuration path is correct and the file exists",
            ),
            std::io::ErrorKind::PermissionDenied => (
                "IO_PERMISSION_DENIED",
                "Check file permissions on the configuration file",
            ),
            _ => (
                "IO_UNKNOWN",
                "Check the file system and try the operation again",
            ),
        };

        Self::Io {
            code,
            message: err.to_string(),
            path: None,
            suggestion: suggestion.to_string(),
            source: err,
        }
    }
}

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        augmentation::Augmentation,
        batched::BatchedAugmentationCache,
        cache::AugmentationCache,
        config::CacheConfig,
        pool::{CachePhase, CacheStats, ReplayState},
        producer::{producer_fn, FnProducer, Producer},
        sample::{Image, Properties, PropertyRecord, Sample},
        shared::SharedAugmentationCache,
        AugmentError, Result,
    };
}

// Re-export key types at the crate root
pub use augmentation::Augmentation;
pub use batched::BatchedAugmentationCache;
pub use cache::AugmentationCache;
pub use config::{CacheConfig, MAX_SEED};
pub use pool::{CachePhase, CacheStats, ReplayState};
pub use producer::{producer_fn, Producer};
pub use sample::{Image, Properties, PropertyRecord, Sample};
pub use shared::SharedAugmentationCache;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
