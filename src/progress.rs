//! Progress reporting for batch operations.
//!
//! Every batch loop (cataloging, extraction, organizing) reports one
//! [`ProgressInfo`] per finished item to the [`ProgressCallback`] configured
//! on [`PipelineConfig`](crate::PipelineConfig), at a cadence set by its
//! batch size.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framesift::{PipelineConfig, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.operation);
//!         }
//!     }
//! }
//!
//! let config = PipelineConfig::new().with_progress(Arc::new(PrintProgress));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The kind of batch currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Probing source videos and writing the manifest.
    Cataloging,
    /// Dumping frames for manifest entries.
    FrameExtraction,
    /// Applying the selection rules to frame folders.
    Organizing,
}

/// A snapshot of batch progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many items have been finished so far.
    pub current: u64,
    /// Total items expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the batch started.
    pub elapsed: Duration,
    /// Display name of the item that just finished.
    pub current_item: Option<String>,
}

/// Trait for receiving progress updates during a batch.
///
/// Callbacks observe; they cannot halt the batch.
pub trait ProgressCallback: Send + Sync {
    /// Called after items finish, every `batch_size` items.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks timing for one batch and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one finished item and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self, item: &str) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(Some(item.to_string()));
            self.items_since_last_report = 0;
        }
    }

    /// Emit a final report if the last items were not reported yet.
    pub(crate) fn finish(&mut self) {
        if self.items_since_last_report > 0 {
            self.report(None);
            self.items_since_last_report = 0;
        }
    }

    fn report(&self, current_item: Option<String>) {
        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| (self.current as f32 / t as f32) * 100.0);

        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
            current_item,
        };

        self.callback.on_progress(&info);
    }
}
