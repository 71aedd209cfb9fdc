//! Lock-step sample pools and replay state
//!
//! [`PoolSet`] is the engine behind both cache front-ends. It owns one pool
//! per producer, all of length `load_size`, plus a single replay state shared
//! by every pool. A reload either refills every pool and re-draws the active
//! slot, or fails and leaves everything as it was.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::CacheConfig;
use crate::producer::Producer;
use crate::sample::Sample;
use crate::{AugmentError, Result};

/// Replay position of a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplayState {
    /// Active pool slot, in `0..load_size`
    pub current_index: usize,
    /// Updates served since the last reload, in `0..updates_per_reload`
    pub updates_since_reload: usize,
    pub updates_per_reload: usize,
}

impl ReplayState {
    pub fn phase(&self) -> CachePhase {
        if self.updates_since_reload == 0 {
            CachePhase::Fresh
        } else {
            CachePhase::Warm
        }
    }
}

/// Whether the active pool has been replayed yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePhase {
    /// Just reloaded, replay index 0
    Fresh,
    /// Replaying a pool that has already served at least one update
    Warm,
}

/// Counters for cache activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Successful `update()` calls
    pub updates: u64,
    /// Completed reloads, including the initial fill
    pub reloads: u64,
    /// Calls made to upstream producers, including failed ones
    pub upstream_calls: u64,
    /// Reloads abandoned because a producer failed
    pub failed_reloads: u64,
}

impl CacheStats {
    /// Replay steps served per upstream call
    pub fn samples_per_upstream_call(&self) -> f64 {
        if self.upstream_calls == 0 {
            0.0
        } else {
            (self.updates + 1) as f64 / self.upstream_calls as f64
        }
    }
}

/// Pools for N paired producers sharing one replay state
pub(crate) struct PoolSet<P, R> {
    producers: Vec<P>,
    /// `pools[producer][slot]`
    pools: Vec<Vec<Sample>>,
    load_size: usize,
    state: ReplayState,
    rng: R,
    stats: CacheStats,
}

impl<P: Producer, R: Rng> PoolSet<P, R> {
    /// Validate the policy, then fill every pool eagerly
    pub(crate) fn new(mut producers: Vec<P>, config: &CacheConfig, mut rng: R) -> Result<Self> {
        config.validate()?;
        if producers.is_empty() {
            return Err(AugmentError::invalid_field(
                "CONFIG_NO_PRODUCERS",
                "At least one upstream producer is required",
                "Batched cache constructed with an empty producer list",
                "Pass one producer per paired output",
                "producers",
            ));
        }

        let mut stats = CacheStats::default();
        let pools = match Self::fill(&mut producers, config.load_size, &mut stats) {
            Ok(pools) => pools,
            Err(e) => {
                warn!("Initial fill of {} slot(s) failed: {}", config.load_size, e);
                return Err(e);
            }
        };
        let current_index = rng.gen_range(0..config.load_size);
        stats.reloads = 1;

        info!(
            "Initialized augmentation cache: {} producer(s), load size {}, {} update(s) per reload",
            producers.len(),
            config.load_size,
            config.updates_per_reload
        );

        Ok(Self {
            producers,
            pools,
            load_size: config.load_size,
            state: ReplayState {
                current_index,
                updates_since_reload: 0,
                updates_per_reload: config.updates_per_reload,
            },
            rng,
            stats,
        })
    }

    /// Draw `load_size` samples from every producer, slot by slot
    fn fill(
        producers: &mut [P],
        load_size: usize,
        stats: &mut CacheStats,
    ) -> Result<Vec<Vec<Sample>>> {
        let mut pools: Vec<Vec<Sample>> = (0..producers.len())
            .map(|_| Vec::with_capacity(load_size))
            .collect();

        for slot in 0..load_size {
            for (index, producer) in producers.iter_mut().enumerate() {
                stats.upstream_calls += 1;
                let sample = producer.produce().map_err(|source| {
                    AugmentError::upstream(
                        format!("Filling slot {} of {}", slot, load_size),
                        Some(index),
                        source,
                    )
                })?;
                pools[index].push(sample);
            }
        }

        Ok(pools)
    }

    /// Advance the replay counter, reloading when it reaches `updates_per_reload`
    ///
    /// A failed reload leaves pools, index and counter untouched.
    pub(crate) fn update(&mut self) -> Result<()> {
        let next = self.state.updates_since_reload + 1;
        if next >= self.state.updates_per_reload {
            self.reload()?;
        } else {
            self.state.updates_since_reload = next;
        }
        self.stats.updates += 1;
        trace!(
            "Update {}: slot {}, replay index {}",
            self.stats.updates,
            self.state.current_index,
            self.state.updates_since_reload
        );
        Ok(())
    }

    /// Replace every pool and re-draw the active slot, all or nothing
    pub(crate) fn reload(&mut self) -> Result<()> {
        let pools = match Self::fill(&mut self.producers, self.load_size, &mut self.stats) {
            Ok(pools) => pools,
            Err(e) => {
                self.stats.failed_reloads += 1;
                warn!("Reload failed, keeping previous pool: {}", e);
                return Err(e);
            }
        };
        let current_index = self.rng.gen_range(0..self.load_size);

        self.pools = pools;
        self.state.current_index = current_index;
        self.state.updates_since_reload = 0;
        self.stats.reloads += 1;

        debug!(
            "Reloaded {} pool(s) of {} sample(s), active slot {} (reload #{})",
            self.pools.len(),
            self.load_size,
            current_index,
            self.stats.reloads
        );
        Ok(())
    }
}

impl<P, R> PoolSet<P, R> {
    pub(crate) fn state(&self) -> ReplayState {
        self.state
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    pub(crate) fn load_size(&self) -> usize {
        self.load_size
    }

    pub(crate) fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Raw sample at the active slot of the first pool
    pub(crate) fn current_primary(&self) -> &Sample {
        // pools is non-empty and current_index < load_size by construction
        &self.pools[0][self.state.current_index]
    }

    /// Raw sample at the active slot of pool `index`
    pub(crate) fn current(&self, index: usize) -> Option<&Sample> {
        self.pools.get(index)?.get(self.state.current_index)
    }

    pub(crate) fn pool(&self, index: usize) -> Option<&[Sample]> {
        self.pools.get(index).map(Vec::as_slice)
    }

    /// Active raw sample of every pool, in producer order
    pub(crate) fn current_all(&self) -> impl Iterator<Item = &Sample> + '_ {
        let slot = self.state.current_index;
        self.pools.iter().map(move |pool| &pool[slot])
    }
}
