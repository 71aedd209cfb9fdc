//! Synthetic upstream producer
//!
//! Renders Gaussian spots at random positions. Each spot gets a property
//! record with its `position` (row, column), `intensity` and `sigma`, so
//! augmentations that move pixels have something to keep consistent.

use std::thread;
use std::time::Duration;

use augcache_core::{Image, Producer, Properties, PropertyRecord, Sample};
use ndarray::ArrayD;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing::trace;

use crate::config::SyntheticConfig;

pub struct SyntheticProducer {
    config: SyntheticConfig,
    rng: StdRng,
    produced: u64,
}

impl SyntheticProducer {
    pub fn new(config: SyntheticConfig) -> anyhow::Result<Self> {
        anyhow::ensure!(
            config.height > 0 && config.width > 0,
            "synthetic image must be at least 1x1, got {}x{}",
            config.height,
            config.width
        );
        anyhow::ensure!(config.sigma > 0.0, "sigma must be positive, got {}", config.sigma);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rng,
            produced: 0,
        })
    }

    fn render(&mut self) -> Sample {
        let (height, width) = (self.config.height, self.config.width);
        let sigma = self.config.sigma;
        let mut image: Image = ArrayD::zeros(vec![height, width]);
        let mut properties = Properties::default();

        for _ in 0..self.config.particles {
            let row = self.rng.gen_range(0.0..height as f64);
            let col = self.rng.gen_range(0.0..width as f64);
            let intensity: f64 = self.rng.gen_range(0.5..1.5);

            for ((r, c), value) in image
                .indexed_iter_mut()
                .map(|(index, value)| ((index[0], index[1]), value))
            {
                let d2 = (r as f64 - row).powi(2) + (c as f64 - col).powi(2);
                *value += intensity * (-d2 / (2.0 * sigma * sigma)).exp();
            }

            properties.push(
                PropertyRecord::new()
                    .with("position", json!([row, col]))
                    .with("intensity", intensity)
                    .with("sigma", sigma),
            );
        }

        Sample::new(image, properties)
    }
}

impl Producer for SyntheticProducer {
    fn produce(&mut self) -> anyhow::Result<Sample> {
        if self.config.latency_ms > 0 {
            thread::sleep(Duration::from_millis(self.config.latency_ms));
        }
        let sample = self.render();
        self.produced += 1;
        trace!("Produced synthetic sample #{}", self.produced);
        Ok(sample)
    }
}
