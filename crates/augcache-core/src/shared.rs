//! Thread-safe handle around an [`AugmentationCache`]
//!
//! The cache itself assumes a single owner. When several threads pull samples
//! from one cache, each `update()`/`resolve()` pair has to happen under one
//! lock, otherwise a reader could interleave with a reload. [`next_sample`]
//! does exactly that.
//!
//! [`next_sample`]: SharedAugmentationCache::next_sample

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::Rng;

use crate::augmentation::Augmentation;
use crate::cache::AugmentationCache;
use crate::config::CacheConfig;
use crate::pool::{CacheStats, ReplayState};
use crate::producer::Producer;
use crate::sample::Sample;
use crate::Result;

/// Cloneable, lock-protected augmentation cache
pub struct SharedAugmentationCache<P, R = StdRng> {
    inner: Arc<Mutex<AugmentationCache<P, R>>>,
}

impl<P, R> Clone for SharedAugmentationCache<P, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Producer> SharedAugmentationCache<P, StdRng> {
    pub fn new(producer: P, config: CacheConfig, augmentation: Augmentation) -> Result<Self> {
        Ok(Self::from_cache(AugmentationCache::new(
            producer,
            config,
            augmentation,
        )?))
    }
}

impl<P, R> SharedAugmentationCache<P, R> {
    pub fn from_cache(cache: AugmentationCache<P, R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn resolve(&self) -> Result<Sample> {
        self.inner.lock().resolve()
    }

    pub fn state(&self) -> ReplayState {
        self.inner.lock().state()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    /// Run `f` with exclusive access to the cache
    pub fn with_cache<T>(&self, f: impl FnOnce(&mut AugmentationCache<P, R>) -> T) -> T {
        f(&mut self.inner.lock())
    }
}

impl<P: Producer, R: Rng> SharedAugmentationCache<P, R> {
    pub fn update(&self) -> Result<()> {
        self.inner.lock().update()
    }

    pub fn reload(&self) -> Result<()> {
        self.inner.lock().reload()
    }

    /// Advance and resolve under a single lock
    pub fn next_sample(&self) -> Result<Sample> {
        self.inner.lock().next_sample()
    }
}
