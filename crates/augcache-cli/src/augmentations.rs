//! Demonstration augmentations selectable from the command line

use augcache_core::{Augmentation, Image, Properties};
use ndarray::Axis;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AugmentationKind {
    /// Serve cached samples unchanged
    Identity,
    /// Mirror left-right on odd replay indices, updating `position`
    Mirror,
    /// Negate pixel values on odd replay indices
    Invert,
}

impl AugmentationKind {
    pub fn build(self) -> Augmentation {
        match self {
            Self::Identity => Augmentation::identity(),
            Self::Mirror => mirror(),
            Self::Invert => Augmentation::new("invert", |image: &Image, n| {
                Ok(if n % 2 == 1 { image.mapv(|v| -v) } else { image.clone() })
            }),
        }
    }
}

impl std::fmt::Display for AugmentationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Identity => "identity",
            Self::Mirror => "mirror",
            Self::Invert => "invert",
        };
        f.write_str(name)
    }
}

fn mirror() -> Augmentation {
    Augmentation::new("mirror", |image: &Image, n| {
        let mut out = image.clone();
        if n % 2 == 1 {
            anyhow::ensure!(image.ndim() >= 2, "mirror needs a 2-D image, got {}-D", image.ndim());
            out.invert_axis(Axis(1));
        }
        Ok(out)
    })
    .with_property_update(|image: &Image, n, properties: &mut Properties| {
        if n % 2 == 0 {
            return Ok(());
        }
        let width = image.shape()[1] as f64;
        properties.for_each_record(|record| {
            if let Some(mut position) = record.get_vector("position") {
                anyhow::ensure!(position.len() >= 2, "position needs (row, column)");
                position[1] = width - 1.0 - position[1];
                record.set("position", json!(position));
            }
            Ok(())
        })
    })
}
