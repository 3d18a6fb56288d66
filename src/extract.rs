//! Frame extraction.
//!
//! [`FrameExtractor`] processes a manifest one video at a time:
//!
//! 1. copy the source into a scratch directory next to it,
//! 2. probe the copy,
//! 3. create `<output root>/<frame count>_<video stem>/` and write the
//!    sidecar there,
//! 4. have ffmpeg dump every frame into it as `%08d.tiff`,
//! 5. remove the scratch copy, and the scratch directory once it is empty.
//!
//! The output root for a manifest `list.txt` is `frames_list/` beside it.
//! A failing video is logged and recorded; the next one is still processed.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::error::FramesiftError;
use crate::manifest::{ManifestEntry, read_manifest};
use crate::metadata::FRAME_COUNT_FIELD;
use crate::probe::MediaProbe;
use crate::progress::{OperationType, ProgressTracker};
use crate::report::BatchReport;
use crate::sidecar::Sidecar;
use crate::tools::ToolRunner;

/// Result of extracting a whole manifest.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Directory holding one frame folder per extracted video.
    pub output_root: PathBuf,
    /// Frame folders that were filled, in manifest order.
    pub frame_dirs: Vec<PathBuf>,
    /// Per-entry outcomes.
    pub report: BatchReport,
}

/// What happened to a single manifest entry that did not error.
enum EntryOutcome {
    Extracted(PathBuf),
    Skipped(String),
}

/// A source copied into the scratch directory. Dropping it deletes the copy
/// and then the scratch directory if nothing else is left in it.
struct ScratchCopy {
    directory: PathBuf,
    path: PathBuf,
}

impl ScratchCopy {
    fn create(source: &Path, directory: PathBuf) -> Result<Self, FramesiftError> {
        fs::create_dir_all(&directory)?;
        let file_name = source.file_name().ok_or_else(|| FramesiftError::FileOpen {
            path: source.to_path_buf(),
            reason: "path has no file name".to_string(),
        })?;
        let copy = Self {
            path: directory.join(file_name),
            directory,
        };
        fs::copy(source, &copy.path).map_err(|e| FramesiftError::FileOpen {
            path: source.to_path_buf(),
            reason: format!("copy to scratch failed: {e}"),
        })?;
        Ok(copy)
    }
}

impl Drop for ScratchCopy {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(error) = fs::remove_file(&self.path) {
                log::warn!(
                    "Could not remove scratch copy {}: {error}",
                    self.path.display()
                );
            }
        }
        if let Err(error) = fs::remove_dir(&self.directory) {
            log::warn!(
                "Could not remove scratch folder {}: {error}",
                self.directory.display()
            );
        }
    }
}

/// Dumps every frame of each manifest entry to numbered image files.
pub struct FrameExtractor<'a> {
    config: &'a PipelineConfig,
    runner: &'a dyn ToolRunner,
}

impl<'a> FrameExtractor<'a> {
    /// Create an extractor.
    pub fn new(config: &'a PipelineConfig, runner: &'a dyn ToolRunner) -> Self {
        Self { config, runner }
    }

    /// The output root used for `manifest_path`: `frames_<stem>` in the
    /// manifest's directory.
    pub fn output_root_for(manifest_path: &Path) -> PathBuf {
        let stem = manifest_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        manifest_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(format!("frames_{stem}"))
    }

    /// Extract every entry of the manifest at `manifest_path`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the manifest cannot be read or the output
    /// root cannot be created. Per-video problems end up in
    /// [`Extraction::report`].
    pub fn extract_manifest(&self, manifest_path: &Path) -> Result<Extraction, FramesiftError> {
        let output_root = Self::output_root_for(manifest_path);
        let entries = read_manifest(manifest_path)?;
        self.extract_entries(&entries, &output_root)
    }

    /// Extract `entries` into `output_root`.
    ///
    /// # Errors
    ///
    /// Returns an error only if `output_root` cannot be created.
    pub fn extract_entries(
        &self,
        entries: &[ManifestEntry],
        output_root: &Path,
    ) -> Result<Extraction, FramesiftError> {
        fs::create_dir_all(output_root).map_err(|e| FramesiftError::FileOpen {
            path: output_root.to_path_buf(),
            reason: e.to_string(),
        })?;

        log::info!(
            "Extracting {} video(s) into {}",
            entries.len(),
            output_root.display()
        );

        let mut tracker = ProgressTracker::new(
            self.config.progress.clone(),
            OperationType::FrameExtraction,
            Some(entries.len() as u64),
            self.config.batch_size,
        );
        let mut extraction = Extraction {
            output_root: output_root.to_path_buf(),
            ..Extraction::default()
        };

        for entry in entries {
            match self.extract_one(&entry.path, output_root) {
                Ok(EntryOutcome::Extracted(frame_dir)) => {
                    log::info!("Frames saved to {}", frame_dir.display());
                    extraction
                        .report
                        .succeeded(&entry.path, format!("frames in {}", frame_dir.display()));
                    extraction.frame_dirs.push(frame_dir);
                }
                Ok(EntryOutcome::Skipped(reason)) => {
                    log::warn!("Skipping {}: {reason}", entry.path.display());
                    extraction.report.skipped(&entry.path, reason);
                }
                Err(error) => {
                    log::error!("Failed processing {}: {error}", entry.path.display());
                    extraction.report.failed(&entry.path, error.to_string());
                }
            }
            tracker.advance(&entry.path.display().to_string());
        }

        tracker.finish();
        Ok(extraction)
    }

    fn extract_one(
        &self,
        video_path: &Path,
        output_root: &Path,
    ) -> Result<EntryOutcome, FramesiftError> {
        if !video_path.is_file() {
            return Err(FramesiftError::FileOpen {
                path: video_path.to_path_buf(),
                reason: "File does not exist".to_string(),
            });
        }

        let scratch_dir = video_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&self.config.scratch_dir_name);
        let scratch = ScratchCopy::create(video_path, scratch_dir)?;

        let metadata = match MediaProbe::new(self.runner, &self.config.tools).probe(&scratch.path)
        {
            Ok(metadata) => metadata,
            Err(error) => return Ok(EntryOutcome::Skipped(format!("unreadable metadata: {error}"))),
        };
        let Some(frame_count) = metadata.get(FRAME_COUNT_FIELD) else {
            return Ok(EntryOutcome::Skipped(format!(
                "metadata has no `{FRAME_COUNT_FIELD}`"
            )));
        };
        let frame_count: u64 =
            frame_count
                .trim()
                .parse()
                .map_err(|_| FramesiftError::MissingField {
                    path: video_path.to_path_buf(),
                    field: FRAME_COUNT_FIELD.to_string(),
                })?;

        let stem = video_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let frame_dir = output_root.join(format!("{frame_count}_{stem}"));
        fs::create_dir_all(&frame_dir)?;

        let original_path = fs::canonicalize(video_path).unwrap_or_else(|_| video_path.to_path_buf());
        Sidecar::new(original_path, metadata).write(&frame_dir.join(&self.config.sidecar_name))?;

        let args = self.dump_args(&scratch.path, &frame_dir);
        self.runner
            .run(&self.config.tools.ffmpeg, &args)?
            .into_result(&self.config.tools.ffmpeg.display().to_string())?;

        Ok(EntryOutcome::Extracted(frame_dir))
    }

    /// ffmpeg arguments dumping every frame of `input` into `frame_dir`.
    pub fn dump_args(&self, input: &Path, frame_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-hide_banner".into()];
        if let Some(level) = self.config.tools.log_level {
            args.push("-v".into());
            args.push(level.as_arg().into());
        }
        args.push("-y".into());
        args.push("-i".into());
        args.push(input.as_os_str().to_os_string());
        args.push("-pix_fmt".into());
        args.push(self.config.frame_pixel_format.as_str().into());
        args.push(frame_dir.join(self.config.frame_pattern()).into_os_string());
        args
    }
}
