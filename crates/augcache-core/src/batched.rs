//! Augmentation cache over several paired producers
//!
//! Logically paired outputs, such as an image and its label map, come from
//! separate producers but must receive the same augmentation. The batched
//! cache keeps one pool per producer in lock-step: every reload draws one
//! sample from each producer for every slot, the active slot is shared, and
//! `resolve()` hands every pool the same replay index.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::augmentation::Augmentation;
use crate::config::CacheConfig;
use crate::pool::{CachePhase, CacheStats, PoolSet, ReplayState};
use crate::producer::Producer;
use crate::sample::Sample;
use crate::Result;

/// Lock-step caches for N paired producers
pub struct BatchedAugmentationCache<P, R = StdRng> {
    pools: PoolSet<P, R>,
    augmentation: Augmentation,
}

impl<P: Producer> BatchedAugmentationCache<P, StdRng> {
    pub fn new(producers: Vec<P>, config: CacheConfig, augmentation: Augmentation) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(producers, config, augmentation, rng)
    }
}

impl<P: Producer, R: Rng> BatchedAugmentationCache<P, R> {
    /// Fails with a configuration error if `producers` is empty
    pub fn with_rng(
        producers: Vec<P>,
        config: CacheConfig,
        augmentation: Augmentation,
        rng: R,
    ) -> Result<Self> {
        let pools = PoolSet::new(producers, &config, rng)?;
        Ok(Self {
            pools,
            augmentation,
        })
    }

    pub fn update(&mut self) -> Result<()> {
        self.pools.update()
    }

    pub fn reload(&mut self) -> Result<()> {
        self.pools.reload()
    }

    pub fn next_sample(&mut self) -> Result<Vec<Sample>> {
        self.update()?;
        self.resolve()
    }
}

impl<P, R> BatchedAugmentationCache<P, R> {
    /// Transformed view of every pool's active sample, in producer order
    pub fn resolve(&self) -> Result<Vec<Sample>> {
        let state = self.pools.state();
        trace!(
            "Resolving slot {} of {} pool(s) at replay index {}",
            state.current_index,
            self.pools.pool_count(),
            state.updates_since_reload
        );
        self.pools
            .current_all()
            .enumerate()
            .map(|(index, raw)| {
                self.augmentation
                    .apply(raw, state.updates_since_reload)
                    .map_err(|e| e.with_pool_index(index))
            })
            .collect()
    }

    pub fn state(&self) -> ReplayState {
        self.pools.state()
    }

    pub fn phase(&self) -> CachePhase {
        self.pools.state().phase()
    }

    pub fn replay_index(&self) -> usize {
        self.pools.state().updates_since_reload
    }

    pub fn current_index(&self) -> usize {
        self.pools.state().current_index
    }

    pub fn load_size(&self) -> usize {
        self.pools.load_size()
    }

    pub fn updates_per_reload(&self) -> usize {
        self.pools.state().updates_per_reload
    }

    /// Number of paired producers
    pub fn pool_count(&self) -> usize {
        self.pools.pool_count()
    }

    /// Untransformed active sample of pool `index`
    pub fn current_raw(&self, index: usize) -> Option<&Sample> {
        self.pools.current(index)
    }

    pub fn pool(&self, index: usize) -> Option<&[Sample]> {
        self.pools.pool(index)
    }

    pub fn augmentation(&self) -> &Augmentation {
        &self.augmentation
    }

    pub fn stats(&self) -> CacheStats {
        self.pools.stats()
    }
}

impl<P, R> std::fmt::Debug for BatchedAugmentationCache<P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchedAugmentationCache")
            .field("augmentation", &self.augmentation)
            .field("pool_count", &self.pool_count())
            .field("load_size", &self.load_size())
            .field("state", &self.state())
            .finish()
    }
}
