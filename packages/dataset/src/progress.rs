//! Progress reporting for dataset loads.
//!
//! Loading the full table can take a while for large exports, so the
//! loaders report row counts through [`ProgressCallback`]. Rendering is
//! left to the caller (an `indicatif` spinner in the CLI, nothing in the
//! server and in tests).

use std::sync::Arc;

/// Receives progress updates from a dataset load.
///
/// Implementations must be `Send + Sync` so a single callback can be shared
/// through an `Arc`.
pub trait ProgressCallback: Send + Sync {
    /// Set the total number of rows expected, when known.
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` rows.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark the load as complete with a final message.
    fn finish(&self, msg: String);
}

/// A [`ProgressCallback`] that ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
