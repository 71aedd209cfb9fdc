//! Augmentation cache over a single upstream producer
//!
//! The cache draws `load_size` raw samples eagerly at construction, picks one
//! slot at random, and serves transformed views of that slot. Each call to
//! [`AugmentationCache::update`] advances the replay index; once it reaches
//! `updates_per_reload` the whole pool is redrawn and a new slot is picked.
//!
//! ```text
//!            update()               update()              update() (n == U)
//!   FRESH ─────────────► WARM ─────────────► WARM ... ───────────────────► FRESH
//!   n = 0                n = 1                                    reload, n = 0
//! ```
//!
//! [`AugmentationCache::resolve`] never changes any of this state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::augmentation::Augmentation;
use crate::config::CacheConfig;
use crate::pool::{CachePhase, CacheStats, PoolSet, ReplayState};
use crate::producer::Producer;
use crate::sample::Sample;
use crate::Result;

/// Caches raw samples from one producer and replays them through an augmentation
pub struct AugmentationCache<P, R = StdRng> {
    pools: PoolSet<P, R>,
    augmentation: Augmentation,
}

impl<P: Producer> AugmentationCache<P, StdRng> {
    /// Build a cache, seeding slot selection from `config.seed` or entropy
    pub fn new(producer: P, config: CacheConfig, augmentation: Augmentation) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(producer, config, augmentation, rng)
    }
}

impl<P: Producer, R: Rng> AugmentationCache<P, R> {
    /// Build a cache with an explicit slot-selection RNG
    ///
    /// Fails with a configuration error before calling the producer if
    /// `load_size` or `updates_per_reload` is zero.
    pub fn with_rng(
        producer: P,
        config: CacheConfig,
        augmentation: Augmentation,
        rng: R,
    ) -> Result<Self> {
        let pools = PoolSet::new(vec![producer], &config, rng)?;
        Ok(Self {
            pools,
            augmentation,
        })
    }

    /// Advance one replay step, reloading the pool when the cycle completes
    pub fn update(&mut self) -> Result<()> {
        self.pools.update()
    }

    /// Redraw the pool immediately and restart the replay cycle
    pub fn reload(&mut self) -> Result<()> {
        self.pools.reload()
    }

    /// `update()` followed by `resolve()`
    pub fn next_sample(&mut self) -> Result<Sample> {
        self.update()?;
        self.resolve()
    }
}

impl<P, R> AugmentationCache<P, R> {
    /// Transformed view of the active raw sample at the current replay index
    ///
    /// Repeated calls without an intervening update return equal samples.
    pub fn resolve(&self) -> Result<Sample> {
        let state = self.pools.state();
        trace!(
            "Resolving slot {} at replay index {}",
            state.current_index,
            state.updates_since_reload
        );
        self.augmentation
            .apply(self.pools.current_primary(), state.updates_since_reload)
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

    /// Untransformed sample at the active slot
    pub fn current_raw(&self) -> &Sample {
        self.pools.current_primary()
    }

    /// Every cached raw sample of the current pool
    pub fn pool(&self) -> &[Sample] {
        self.pools.pool(0).unwrap_or(&[])
    }

    pub fn augmentation(&self) -> &Augmentation {
        &self.augmentation
    }

    pub fn stats(&self) -> CacheStats {
        self.pools.stats()
    }
}

impl<P, R> std::fmt::Debug for AugmentationCache<P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AugmentationCache")
            .field("augmentation", &self.augmentation)
            .field("load_size", &self.load_size())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::producer_fn;
    use crate::sample::Image;
    use ndarray::ArrayD;
    use std::cell::Cell;
    use std::rc::Rc;

    fn sequence_producer(calls: Rc<Cell<usize>>) -> impl Producer {
        producer_fn(move || {
            calls.set(calls.get() + 1);
            Ok(Sample::from_image(ArrayD::from_elem(vec![2, 2], calls.get() as f64)))
        })
    }

    fn negate_odd() -> Augmentation {
        Augmentation::new("negate-odd", |image: &Image, n| {
            Ok(if n % 2 == 1 { image.mapv(|v| -v) } else { image.clone() })
        })
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = AugmentationCache::new(
            sequence_producer(calls.clone()),
            CacheConfig::new(3, 4).with_seed(1),
            negate_odd(),
        )
        .unwrap();

        cache.update().unwrap();
        let first = cache.resolve().unwrap();
        let second = cache.resolve().unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.replay_index(), 1);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_zero_config_makes_no_upstream_calls() {
        for config in [CacheConfig::new(0, 2), CacheConfig::new(2, 0)] {
            let calls = Rc::new(Cell::new(0));
            let producer = sequence_producer(calls.clone());
            let error = AugmentationCache::new(producer, config, negate_odd()).unwrap_err();
            assert!(error.is_config());
            assert_eq!(calls.get(), 0);
        }
    }

    #[test]
    fn test_next_sample_walks_the_cycle() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = AugmentationCache::new(
            sequence_producer(calls.clone()),
            CacheConfig::new(1, 2).with_seed(9),
            negate_odd(),
        )
        .unwrap();

        assert_eq!(cache.resolve().unwrap().image.sum(), 4.0);
        assert_eq!(cache.next_sample().unwrap().image.sum(), -4.0);
        assert_eq!(cache.next_sample().unwrap().image.sum(), 8.0);
        assert_eq!(cache.phase(), CachePhase::Fresh);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_forced_reload_restarts_cycle() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = AugmentationCache::new(
            sequence_producer(calls.clone()),
            CacheConfig::new(2, 10).with_seed(5),
            Augmentation::identity(),
        )
        .unwrap();

        cache.update().unwrap();
        cache.update().unwrap();
        cache.reload().unwrap();

        assert_eq!(cache.replay_index(), 0);
        assert_eq!(calls.get(), 4);
        assert_eq!(cache.stats().reloads, 2);
        assert!(cache.pool().iter().all(|s| s.image.sum() >= 12.0));
    }

    #[test]
    fn test_current_raw_is_untransformed() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = AugmentationCache::new(
            sequence_producer(calls),
            CacheConfig::new(1, 3).with_seed(2),
            negate_odd(),
        )
        .unwrap();

        cache.update().unwrap();
        let resolved = cache.resolve().unwrap();
        assert_eq!(resolved.image.sum(), -4.0);
        assert_eq!(cache.current_raw().image.sum(), 4.0);
    }
}
