//! Applying selection plans to frame folders on disk.
//!
//! [`FrameSelector`] visits every per-video folder under a frames root,
//! recovers the nominal frame count from its sidecar, lists the loose frame
//! files, asks [`SelectionRules::plan`](crate::SelectionRules::plan) what to
//! keep, and then executes the plan:
//!
//! - **discard**: the whole folder is removed,
//! - **unmatched**: the folder is left unsorted and a warning is logged,
//! - **keep**: selected frames move into numbered subfolders and every other
//!   loose frame file is deleted.
//!
//! A folder whose sidecar is missing or unparsable is never touched.
//! Neither is a folder that already holds numbered subfolders and no loose
//! frames, so running the selector twice changes nothing the second time.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{FolderOutcome, FrameSelector, PipelineConfig};
//!
//! let config = PipelineConfig::new();
//! let selector = FrameSelector::new(&config);
//! match selector.organize_folder("frames_day1/300_A001_C002")? {
//!     FolderOutcome::Sorted { groups, kept, .. } => {
//!         println!("{kept} frames in {groups} subfolders");
//!     }
//!     other => println!("{other}"),
//! }
//! # Ok::<(), framesift::FramesiftError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::error::FramesiftError;
use crate::progress::{OperationType, ProgressTracker};
use crate::report::BatchReport;
use crate::selection::{DiscardReason, SelectionPlan};
use crate::sidecar::Sidecar;

/// What the selector did with one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderOutcome {
    /// The folder was deleted.
    Removed(DiscardReason),
    /// No rule covers the nominal count; the folder was left unsorted.
    Unmatched {
        /// Nominal frame count read from the sidecar.
        nominal: i64,
    },
    /// Frames were moved into numbered subfolders.
    Sorted {
        /// Subfolders created.
        groups: usize,
        /// Frames moved into subfolders.
        kept: usize,
        /// Loose frames deleted afterwards.
        deleted: usize,
    },
    /// Only numbered subfolders remain; nothing to do.
    AlreadySorted,
    /// The folder was left untouched.
    Skipped(String),
}

impl Display for FolderOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FolderOutcome::Removed(reason) => write!(f, "removed: {reason}"),
            FolderOutcome::Unmatched { nominal } => {
                write!(f, "no rule for nominal frame count {nominal}, left unsorted")
            }
            FolderOutcome::Sorted {
                groups,
                kept,
                deleted,
            } => write!(
                f,
                "kept {kept} frame(s) in {groups} subfolder(s), deleted {deleted}"
            ),
            FolderOutcome::AlreadySorted => write!(f, "already sorted"),
            FolderOutcome::Skipped(reason) => write!(f, "skipped: {reason}"),
        }
    }
}

/// Curates extracted frame folders.
pub struct FrameSelector<'a> {
    config: &'a PipelineConfig,
}

impl<'a> FrameSelector<'a> {
    /// Create a selector.
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Organize every subfolder of `frames_root`, in name order.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::FileOpen`] if `frames_root` cannot be
    /// listed. Per-folder problems end up in the returned report.
    pub fn organize_all(&self, frames_root: impl AsRef<Path>) -> Result<BatchReport, FramesiftError> {
        let frames_root = frames_root.as_ref();
        let folders = self.video_folders(frames_root)?;

        log::info!(
            "Organizing {} folder(s) under {}",
            folders.len(),
            frames_root.display()
        );

        let mut tracker = ProgressTracker::new(
            self.config.progress.clone(),
            OperationType::Organizing,
            Some(folders.len() as u64),
            self.config.batch_size,
        );
        let mut report = BatchReport::default();

        for folder in folders {
            match self.organize_folder(&folder) {
                Ok(outcome @ (FolderOutcome::Skipped(_) | FolderOutcome::Unmatched { .. })) => {
                    report.skipped(&folder, outcome.to_string());
                }
                Ok(outcome) => report.succeeded(&folder, outcome.to_string()),
                Err(error) => {
                    log::error!("Failed organizing {}: {error}", folder.display());
                    report.failed(&folder, error.to_string());
                }
            }
            tracker.advance(&folder.display().to_string());
        }

        tracker.finish();
        Ok(report)
    }

    fn video_folders(&self, frames_root: &Path) -> Result<Vec<PathBuf>, FramesiftError> {
        let read_error = |e: std::io::Error| FramesiftError::FileOpen {
            path: frames_root.to_path_buf(),
            reason: e.to_string(),
        };

        let mut folders = Vec::new();
        for entry in fs::read_dir(frames_root).map_err(read_error)? {
            let path = entry.map_err(read_error)?.path();
            if path.is_dir() {
                folders.push(path);
            }
        }
        folders.sort();
        Ok(folders)
    }

    /// Organize one per-video folder.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if listing, moving, or deleting files fails.
    /// A missing or unreadable sidecar is not an error; it yields
    /// [`FolderOutcome::Skipped`].
    pub fn organize_folder(&self, folder: impl AsRef<Path>) -> Result<FolderOutcome, FramesiftError> {
        let folder = folder.as_ref();

        let nominal = match Sidecar::read(&folder.join(&self.config.sidecar_name))
            .and_then(|sidecar| sidecar.nominal_frame_count())
        {
            Ok(nominal) => nominal,
            Err(error) => {
                log::warn!("Skipping {}: {error}", folder.display());
                return Ok(FolderOutcome::Skipped(error.to_string()));
            }
        };

        let (frames, has_subfolders) = self.scan_folder(folder)?;
        if frames.is_empty() && has_subfolders {
            log::info!("{} is already sorted", folder.display());
            return Ok(FolderOutcome::AlreadySorted);
        }

        let plan = self.config.rules.plan(nominal, frames.len());
        log::debug!(
            "{}: N={nominal}, A={}, plan={plan:?}",
            folder.display(),
            frames.len()
        );

        match plan {
            SelectionPlan::Discard(reason) => {
                fs::remove_dir_all(folder)?;
                log::info!("Removed {}: {reason}", folder.display());
                Ok(FolderOutcome::Removed(reason))
            }
            SelectionPlan::Unmatched => {
                log::warn!(
                    "No selection rule for {} (nominal frame count {nominal})",
                    folder.display()
                );
                Ok(FolderOutcome::Unmatched { nominal })
            }
            SelectionPlan::Keep(groups) => {
                let mut kept = 0;
                for group in &groups {
                    let subfolder = folder.join(self.config.subfolder_name(group.number));
                    fs::create_dir_all(&subfolder)?;
                    for &index in &group.indices {
                        let frame = &frames[index];
                        if let Some(name) = frame.file_name() {
                            fs::rename(frame, subfolder.join(name))?;
                            kept += 1;
                        }
                    }
                }

                let (leftovers, _) = self.scan_folder(folder)?;
                for frame in &leftovers {
                    fs::remove_file(frame)?;
                }

                let outcome = FolderOutcome::Sorted {
                    groups: groups.len(),
                    kept,
                    deleted: leftovers.len(),
                };
                log::info!("Sorted {}: {outcome}", folder.display());
                Ok(outcome)
            }
        }
    }

    /// Loose frame files at the top level of `folder`, sorted by name, and
    /// whether any numbered subfolder exists.
    fn scan_folder(&self, folder: &Path) -> Result<(Vec<PathBuf>, bool), FramesiftError> {
        let mut frames = Vec::new();
        let mut has_subfolders = false;
        for entry in fs::read_dir(folder)? {
            let path = entry?.path();
            if path.is_dir() {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                has_subfolders |= self.config.is_subfolder_name(&name);
            } else if self.config.is_frame_file(&path) {
                frames.push(path);
            }
        }
        frames.sort();
        Ok((frames, has_subfolders))
    }
}
