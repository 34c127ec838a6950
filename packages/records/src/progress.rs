//! Progress reporting for source loading.
//!
//! Loaders report through [`ProgressCallback`] so the CLI can render
//! `indicatif` bars while tests and library callers stay silent with
//! [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from a loader.
///
/// Implementations must be `Send + Sync` so one callback can be shared by
/// the spawned primary and fallback fetches.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work (rows, features).
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
