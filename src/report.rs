//! Batch outcome reports.
//!
//! Every batch operation isolates per-item failures: an item that fails is
//! logged, recorded here, and the batch moves on. The resulting
//! [`BatchReport`] lists what happened to each item.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{FrameSelector, PipelineConfig};
//!
//! let config = PipelineConfig::new();
//! let report = FrameSelector::new(&config).organize_all("frames_day1")?;
//! if !report.is_clean() {
//!     print!("{report}");
//! }
//! # Ok::<(), framesift::FramesiftError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

use serde_json::{Value, json};

/// How one item of a batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    /// The item was processed.
    Succeeded,
    /// The item was deliberately left alone.
    Skipped,
    /// Processing the item failed.
    Failed,
}

impl ItemStatus {
    fn label(self) -> &'static str {
        match self {
            ItemStatus::Succeeded => "OK",
            ItemStatus::Skipped => "SKIP",
            ItemStatus::Failed => "FAIL",
        }
    }
}

/// The outcome of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    /// The file or folder the outcome is about.
    pub path: PathBuf,
    /// How it ended.
    pub status: ItemStatus,
    /// A human-readable explanation.
    pub message: String,
}

/// Per-item outcomes of one batch, in processing order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// All outcomes, in processing order.
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    /// Record a success.
    pub fn succeeded(&mut self, path: &Path, message: impl Into<String>) {
        self.push(path, ItemStatus::Succeeded, message.into());
    }

    /// Record a deliberate skip.
    pub fn skipped(&mut self, path: &Path, message: impl Into<String>) {
        self.push(path, ItemStatus::Skipped, message.into());
    }

    /// Record a failure.
    pub fn failed(&mut self, path: &Path, message: impl Into<String>) {
        self.push(path, ItemStatus::Failed, message.into());
    }

    fn push(&mut self, path: &Path, status: ItemStatus, message: String) {
        self.items.push(ItemOutcome {
            path: path.to_path_buf(),
            status,
            message,
        });
    }

    /// Number of items with `status`.
    pub fn count(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|item| item.status == status).count()
    }

    /// Items with `status`, in processing order.
    pub fn with_status(&self, status: ItemStatus) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(move |item| item.status == status)
    }

    /// Returns `true` if nothing failed. Skips do not count as failures.
    pub fn is_clean(&self) -> bool {
        self.count(ItemStatus::Failed) == 0
    }

    /// Machine-readable form.
    pub fn to_json(&self) -> Value {
        json!({
            "succeeded": self.count(ItemStatus::Succeeded),
            "skipped": self.count(ItemStatus::Skipped),
            "failed": self.count(ItemStatus::Failed),
            "items": self.items.iter().map(|item| json!({
                "path": item.path.display().to_string(),
                "status": item.status.label(),
                "message": item.message,
            })).collect::<Vec<_>>(),
        })
    }
}

impl Display for BatchReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.items {
            writeln!(
                f,
                "[{}] {}: {}",
                item.status.label(),
                item.path.display(),
                item.message
            )?;
        }
        if self.items.is_empty() {
            writeln!(f, "Nothing to do.")?;
        }
        Ok(())
    }
}
