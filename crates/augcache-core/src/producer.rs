//! Upstream producer contract

use crate::sample::Sample;

/// Expensive upstream source of raw samples
///
/// Implementations may be randomized and are not expected to be idempotent.
/// Any caching the producer does internally is its own concern; the
/// augmentation cache calls [`Producer::produce`] once per pool slot on every
/// reload.
pub trait Producer {
    fn produce(&mut self) -> anyhow::Result<Sample>;
}

impl<P: Producer + ?Sized> Producer for Box<P> {
    fn produce(&mut self) -> anyhow::Result<Sample> {
        (**self).produce()
    }
}

/// Producer backed by a closure, see [`producer_fn`]
pub struct FnProducer<F> {
    f: F,
}

impl<F> Producer for FnProducer<F>
where
    F: FnMut() -> anyhow::Result<Sample>,
{
    fn produce(&mut self) -> anyhow::Result<Sample> {
        (self.f)()
    }
}

impl<F> std::fmt::Debug for FnProducer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnProducer").finish_non_exhaustive()
    }
}

/// Wrap a closure as a [`Producer`]
pub fn producer_fn<F>(f: F) -> FnProducer<F>
where
    F: FnMut() -> anyhow::Result<Sample>,
{
    FnProducer { f }
}
