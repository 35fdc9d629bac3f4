//! The warning channel used by `allow`, `deprecate` and `suppress_warnings`.
//!
//! A [`Warnings`] handle is injected into the wrappers that warn. Clones of a handle share
//! the same current sink, so muting one clone mutes the wrappers holding the others.
//! [`Warnings::default`] is the process-wide channel every wrapper uses unless given another.

use arc_swap::ArcSwap;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::warn;

/// Where warnings end up.
#[cfg_attr(test, mockall::automock)]
pub trait WarningSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// Logs warnings with `tracing` under the `micro_wrap::warnings` target.
#[derive(Default, Copy, Clone, Debug)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, message: &str) {
        warn!(target: "micro_wrap::warnings", "{message}");
    }
}

/// Drops every warning.
#[derive(Default, Copy, Clone, Debug)]
pub struct SilentSink;

impl WarningSink for SilentSink {
    #[inline]
    fn warn(&self, _message: &str) {}
}

type BoxedSink = Box<dyn WarningSink>;

#[derive(Clone)]
pub struct Warnings {
    current: Arc<ArcSwap<BoxedSink>>,
}

impl Warnings {
    pub fn new<S: WarningSink + 'static>(sink: S) -> Self {
        let boxed: BoxedSink = Box::new(sink);
        Self { current: Arc::new(ArcSwap::from_pointee(boxed)) }
    }

    pub fn builder() -> WarningsBuilder {
        WarningsBuilder::new()
    }

    pub fn warn(&self, message: &str) {
        self.current.load().warn(message);
    }

    /// route warnings to `sink` until the returned guard is dropped
    pub fn replace<S: WarningSink + 'static>(&self, sink: S) -> SinkGuard {
        let boxed: BoxedSink = Box::new(sink);
        let previous = self.current.swap(Arc::new(boxed));
        SinkGuard { warnings: self.clone(), previous: Some(previous) }
    }

    /// mute the channel until the returned guard is dropped
    pub fn suppress(&self) -> SinkGuard {
        self.replace(SilentSink)
    }

    pub fn ptr_eq(&self, other: &Warnings) -> bool {
        Arc::ptr_eq(&self.current, &other.current)
    }
}

static DEFAULT_WARNINGS: LazyLock<Warnings> = LazyLock::new(|| Warnings::new(TracingSink));

impl Default for Warnings {
    /// a handle on the shared process-wide channel, logging through `tracing`
    fn default() -> Self {
        DEFAULT_WARNINGS.clone()
    }
}

impl fmt::Debug for Warnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Warnings").finish_non_exhaustive()
    }
}

/// Restores the previous sink on drop.
#[must_use = "the previous sink is restored as soon as the guard is dropped"]
pub struct SinkGuard {
    warnings: Warnings,
    previous: Option<Arc<BoxedSink>>,
}

impl Drop for SinkGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.warnings.current.store(previous);
        }
    }
}

impl fmt::Debug for SinkGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkGuard").finish_non_exhaustive()
    }
}

pub struct WarningsBuilder {
    sink: Option<BoxedSink>,
}

impl WarningsBuilder {
    fn new() -> Self {
        Self { sink: None }
    }

    pub fn sink<S: WarningSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn silent(self) -> Self {
        self.sink(SilentSink)
    }

    /// a new channel of its own, separate from [`Warnings::default`]
    pub fn build(self) -> Warnings {
        let sink: BoxedSink = match self.sink {
            Some(sink) => sink,
            None => Box::new(TracingSink),
        };
        Warnings { current: Arc::new(ArcSwap::from_pointee(sink)) }
    }
}

impl fmt::Debug for WarningsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarningsBuilder").field("custom_sink", &self.sink.is_some()).finish()
    }
}
