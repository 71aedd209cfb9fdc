//! Run command implementation
//!
//! Builds a cache over the synthetic producer, drives it for a number of
//! `update()` + `resolve()` steps and reports how much upstream work the
//! reload policy saved.

use anyhow::{Context, Result};
use augcache_core::{AugmentationCache, CacheConfig, Sample, MAX_SEED};
use clap::Args;
use indicatif::ProgressBar;
use serde_json::json;
use std::time::Instant;
use tracing::{debug, info};

use crate::augmentations::AugmentationKind;
use crate::commands::Command;
use crate::config::Config;
use crate::synthetic::SyntheticProducer;
use crate::utils::{create_progress_bar, format_duration, print_output};

#[derive(Args, Debug)]
pub struct RunCommand {
    /// Number of update + resolve steps (overrides config)
    #[arg(short, long)]
    pub steps: Option<usize>,

    /// Raw samples per reload (overrides config)
    #[arg(short, long)]
    pub load_size: Option<usize>,

    /// Updates served per pool before reloading (overrides config)
    #[arg(short, long)]
    pub updates_per_reload: Option<usize>,

    /// Augmentation to apply (overrides config)
    #[arg(short, long, value_enum)]
    pub augmentation: Option<AugmentationKind>,

    /// Seed for slot selection and the synthetic producer (overrides config)
    #[arg(long, value_parser = clap::value_parser!(u64).range(..=MAX_SEED))]
    pub seed: Option<u64>,

    /// Include the last resolved sample's properties in the report
    #[arg(long)]
    pub show_sample: bool,
}

impl RunCommand {
    fn cache_config(&self, config: &Config) -> CacheConfig {
        let mut cache = config.cache.clone();
        if let Some(load_size) = self.load_size {
            cache.load_size = load_size;
        }
        if let Some(updates_per_reload) = self.updates_per_reload {
            cache.updates_per_reload = updates_per_reload;
        }
        if let Some(seed) = self.seed {
            cache.seed = Some(seed);
        }
        cache
    }
}

impl Command for RunCommand {
    fn execute(&self, config: &Config, json_output: bool) -> Result<()> {
        debug!("Executing run command: {:?}", self);

        let cache_config = self.cache_config(config);
        let steps = self.steps.unwrap_or(config.run.steps);
        let kind = self.augmentation.unwrap_or(config.run.augmentation);

        let mut synthetic = config.synthetic.clone();
        if let Some(seed) = self.seed {
            synthetic.seed = Some(seed);
        }
        let producer =
            SyntheticProducer::new(synthetic).context("Invalid [synthetic] configuration")?;

        let started = Instant::now();
        let mut cache = AugmentationCache::new(producer, cache_config.clone(), kind.build())
            .context("Failed to build augmentation cache")?;
        info!(
            "Running {} step(s) with '{}' (load size {}, {} update(s) per reload)",
            steps, kind, cache_config.load_size, cache_config.updates_per_reload
        );

        let progress = if json_output || steps < 2 {
            ProgressBar::hidden()
        } else {
            create_progress_bar(steps as u64, "replaying")
        };

        let mut last: Option<Sample> = None;
        for _ in 0..steps {
            last = Some(cache.next_sample().context("Replay step failed")?);
            progress.inc(1);
        }
        progress.finish_and_clear();
        let elapsed = started.elapsed();

        let stats = cache.stats();
        let mut report = json!({
            "augmentation": kind.to_string(),
            "steps": steps,
            "load_size": cache_config.load_size,
            "updates_per_reload": cache_config.updates_per_reload,
            "upstream_calls": stats.upstream_calls,
            "reloads": stats.reloads,
            "failed_reloads": stats.failed_reloads,
            "samples_per_upstream_call": stats.samples_per_upstream_call(),
            "final_state": cache.state(),
            "elapsed_ms": elapsed.as_millis() as u64,
        });
        if !json_output {
            report["elapsed"] = json!(format_duration(elapsed));
        }
        if self.show_sample {
            if let Some(sample) = &last {
                report["last_sample"] = json!({
                    "shape": sample.image.shape(),
                    "properties": sample.properties,
                });
            }
        }

        print_output(&report, json_output)
    }
}
