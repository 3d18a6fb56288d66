//! # framesift
//!
//! Sample still frames from batches of video files.
//!
//! `framesift` drives the `ffmpeg` and `ffprobe` binaries through a
//! three-stage pipeline:
//!
//! 1. **Catalog**: probe every source video in a directory and write a
//!    manifest of `<path> : <frame count>` lines.
//! 2. **Extract**: dump every frame of each manifest entry as a numbered
//!    image, next to a sidecar recording the source path and its metadata.
//! 3. **Organize**: apply a count-dependent rule table to each frame folder,
//!    move the selected frames into numbered subfolders and delete the rest.
//!
//! A standalone [`RangeTrimmer`] cuts a time range out of one video by
//! stream copy.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use framesift::{Cataloger, FrameExtractor, FrameSelector, PipelineConfig, SystemRunner};
//!
//! let config = PipelineConfig::new();
//! let manifest = Path::new("day1.txt");
//!
//! Cataloger::new(&config, &SystemRunner).catalog(Path::new("/media/card"), manifest)?;
//! let extraction = FrameExtractor::new(&config, &SystemRunner).extract_manifest(manifest)?;
//! let report = FrameSelector::new(&config).organize_all(&extraction.output_root)?;
//! print!("{report}");
//! # Ok::<(), framesift::FramesiftError>(())
//! ```
//!
//! ## Selection Rules
//!
//! Selection is index based: frames are ordered by their zero-padded file
//! names and picked by position. See [`SelectionRules`] for the default
//! table; a custom table can be supplied with
//! [`PipelineConfig::with_rules`].
//!
//! ## Failure Handling
//!
//! Batch operations never stop at a bad item. Each item's outcome is logged
//! through the [`log`](https://docs.rs/log) facade and recorded in a
//! [`BatchReport`]. The selector is conservative: a folder whose sidecar is
//! missing or unreadable is left exactly as it was.
//!
//! ## Requirements
//!
//! `ffmpeg` and `ffprobe` must be installed and on `PATH`, or configured
//! with [`PipelineConfig::with_ffmpeg`] and [`PipelineConfig::with_ffprobe`].

pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod manifest;
pub mod metadata;
pub mod organize;
pub mod permissions;
pub mod probe;
pub mod progress;
pub mod report;
pub mod selection;
pub mod sidecar;
pub mod tools;
pub mod trim;
pub mod utilities;

pub use catalog::{Catalog, Cataloger};
pub use config::{PipelineConfig, ScanFilter, ToolConfig};
pub use error::FramesiftError;
pub use extract::{Extraction, FrameExtractor};
pub use manifest::{ManifestEntry, read_manifest, write_manifest};
pub use metadata::MetadataRecord;
pub use organize::{FolderOutcome, FrameSelector};
pub use permissions::ensure_read_write;
pub use probe::MediaProbe;
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use report::{BatchReport, ItemOutcome, ItemStatus};
pub use selection::{
    DiscardReason, FrameGroup, FrameWindow, SelectionPlan, SelectionRule, SelectionRules,
};
pub use sidecar::Sidecar;
pub use tools::{SystemRunner, ToolLogLevel, ToolOutput, ToolRunner, tool_available};
pub use trim::{RangeTrimmer, TrimSummary};
