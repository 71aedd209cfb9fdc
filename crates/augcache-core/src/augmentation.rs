//! Augmentation hooks applied to cached samples
//!
//! An [`Augmentation`] is a pair of typed function values:
//!
//! - `get(image, replay_index) -> image'` produces the transformed image
//! - `update_properties(image, replay_index, properties)` (optional) edits a
//!   copy of the sample's properties so they stay consistent with `get`
//!
//! Both hooks receive the same untransformed image and the same replay index.
//! Different augmentations are different values of this type, not subtypes.

use std::fmt;
use std::sync::Arc;

use crate::sample::{Image, Properties, Sample};
use crate::{AugmentError, Result};

/// Image transform hook
pub type GetFn = dyn Fn(&Image, usize) -> anyhow::Result<Image> + Send + Sync;

/// Property update hook
pub type UpdatePropertiesFn =
    dyn Fn(&Image, usize, &mut Properties) -> anyhow::Result<()> + Send + Sync;

/// Named pair of transform and property-update hooks
#[derive(Clone)]
pub struct Augmentation {
    name: String,
    get: Arc<GetFn>,
    update_properties: Option<Arc<UpdatePropertiesFn>>,
}

impl Augmentation {
    pub fn new<S, F>(name: S, get: F) -> Self
    where
        S: Into<String>,
        F: Fn(&Image, usize) -> anyhow::Result<Image> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            get: Arc::new(get),
            update_properties: None,
        }
    }

    /// Augmentation that returns every sample unchanged
    pub fn identity() -> Self {
        Self::new("identity", |image: &Image, _| Ok(image.clone()))
    }

    /// Attach a property update hook
    pub fn with_property_update<F>(mut self, update: F) -> Self
    where
        F: Fn(&Image, usize, &mut Properties) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.update_properties = Some(Arc::new(update));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_property_update(&self) -> bool {
        self.update_properties.is_some()
    }

    /// Produce the transformed view of `raw` at `replay_index`
    ///
    /// `raw` is only borrowed; the returned sample owns fresh image data and
    /// an independent copy of the property records.
    pub fn apply(&self, raw: &Sample, replay_index: usize) -> Result<Sample> {
        let image = (self.get)(&raw.image, replay_index).map_err(|source| {
            AugmentError::transform(
                "TRANSFORM_GET_FAILED",
                self.name.as_str(),
                "Applying the image transform hook",
                replay_index,
                source,
            )
        })?;

        let mut properties = raw.properties.clone();
        if let Some(update) = &self.update_properties {
            update(&raw.image, replay_index, &mut properties).map_err(|source| {
                AugmentError::transform(
                    "TRANSFORM_PROPERTIES_FAILED",
                    self.name.as_str(),
                    "Applying the property update hook",
                    replay_index,
                    source,
                )
            })?;
        }

        Ok(Sample { image, properties })
    }
}

impl Default for Augmentation {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for Augmentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Augmentation")
            .field("name", &self.name)
            .field("has_property_update", &self.has_property_update())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::PropertyRecord;
    use ndarray::{ArrayD, Axis};
    use serde_json::json;

    fn mirror() -> Augmentation {
        Augmentation::new("mirror", |image: &Image, n| {
            let mut out = image.clone();
            if n % 2 == 1 {
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
                    position[1] = width - 1.0 - position[1];
                    record.set("position", json!(position));
                }
                Ok(())
            })
        })
    }

    fn sample() -> Sample {
        let image = ArrayD::from_shape_vec(vec![1, 4], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let record = PropertyRecord::new().with("position", json!([0, 1]));
        let properties = Properties::new(vec![record]);
        Sample::new(image, properties)
    }

    #[test]
    fn test_identity_returns_equal_sample() {
        let raw = sample();
        let out = Augmentation::identity().apply(&raw, 5).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn test_property_update_follows_transform() {
        let raw = sample();
        let out = mirror().apply(&raw, 1).unwrap();

        assert_eq!(out.image.iter().copied().collect::<Vec<_>>(), vec![4.0, 3.0, 2.0, 1.0]);
        assert_eq!(out.properties.records()[0].get_vector("position"), Some(vec![0.0, 2.0]));
        // raw sample is untouched
        assert_eq!(raw.properties.records()[0].get_vector("position"), Some(vec![0.0, 1.0]));
    }

    #[test]
    fn test_get_failure_maps_to_transform_error() {
        let failing = Augmentation::new("broken", |_: &Image, _| Err(anyhow::anyhow!("no")));
        let error = failing.apply(&sample(), 0).unwrap_err();

        assert!(error.is_transform());
        assert_eq!(error.code(), "TRANSFORM_GET_FAILED");
    }

    #[test]
    fn test_property_failure_maps_to_transform_error() {
        let failing = Augmentation::identity()
            .with_property_update(|_: &Image, _, _: &mut Properties| Err(anyhow::anyhow!("no")));
        let error = failing.apply(&sample(), 0).unwrap_err();

        assert_eq!(error.code(), "TRANSFORM_PROPERTIES_FAILED");
    }
}
