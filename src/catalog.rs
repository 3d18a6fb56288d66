//! Frame-count cataloging.
//!
//! [`Cataloger`] walks one directory of source videos, normalizes each
//! file's permissions, probes it, and writes a manifest line with its
//! reported frame count. A file that cannot be probed, or whose metadata
//! has no frame count, is skipped; the rest of the directory is still
//! cataloged.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::error::FramesiftError;
use crate::manifest::{ManifestEntry, write_manifest};
use crate::metadata::FRAME_COUNT_FIELD;
use crate::permissions::ensure_read_write;
use crate::probe::MediaProbe;
use crate::progress::{OperationType, ProgressTracker};
use crate::report::BatchReport;
use crate::tools::ToolRunner;

/// Entries written by one cataloging run, plus what happened to each file.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Manifest entries, in the order they were written.
    pub entries: Vec<ManifestEntry>,
    /// Per-file outcomes.
    pub report: BatchReport,
}

/// Builds frame-count manifests.
pub struct Cataloger<'a> {
    config: &'a PipelineConfig,
    runner: &'a dyn ToolRunner,
}

impl<'a> Cataloger<'a> {
    /// Create a cataloger.
    pub fn new(config: &'a PipelineConfig, runner: &'a dyn ToolRunner) -> Self {
        Self { config, runner }
    }

    /// Source videos in `folder` accepted by the scan filter, sorted by
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::FileOpen`] if the directory cannot be read.
    pub fn source_files(&self, folder: &Path) -> Result<Vec<PathBuf>, FramesiftError> {
        let read_error = |e: std::io::Error| FramesiftError::FileOpen {
            path: folder.to_path_buf(),
            reason: e.to_string(),
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(folder).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            let name = entry.file_name();
            if !self.config.scan.accepts(&name.to_string_lossy()) {
                continue;
            }
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Catalog every source video in `folder` and write the manifest to
    /// `manifest_path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error only if `folder` cannot be listed or the manifest
    /// cannot be written. Per-file problems end up in [`Catalog::report`].
    pub fn catalog(&self, folder: &Path, manifest_path: &Path) -> Result<Catalog, FramesiftError> {
        let files = self.source_files(folder)?;

        log::info!(
            "Cataloging {} file(s) from {} into {}",
            files.len(),
            folder.display(),
            manifest_path.display()
        );

        let probe = MediaProbe::new(self.runner, &self.config.tools);
        let mut tracker = ProgressTracker::new(
            self.config.progress.clone(),
            OperationType::Cataloging,
            Some(files.len() as u64),
            self.config.batch_size,
        );
        let mut catalog = Catalog::default();

        for path in files {
            if let Some(entry) = self.catalog_one(&probe, &path, &mut catalog.report) {
                catalog.entries.push(entry);
            }
            tracker.advance(&path.display().to_string());
        }

        tracker.finish();
        write_manifest(manifest_path, &catalog.entries)?;
        Ok(catalog)
    }

    fn catalog_one(
        &self,
        probe: &MediaProbe<'_>,
        path: &Path,
        report: &mut BatchReport,
    ) -> Option<ManifestEntry> {
        if let Err(error) = ensure_read_write(path) {
            log::error!("Failed to prepare {}: {error}", path.display());
            report.failed(path, error.to_string());
            return None;
        }

        let record = match probe.probe(path) {
            Ok(record) => record,
            Err(error) => {
                log::warn!("Skipping unreadable file {}: {error}", path.display());
                report.skipped(path, format!("unreadable metadata: {error}"));
                return None;
            }
        };

        let Some(frame_count) = record.get(FRAME_COUNT_FIELD) else {
            let error = FramesiftError::MissingField {
                path: path.to_path_buf(),
                field: FRAME_COUNT_FIELD.to_string(),
            };
            log::warn!("Skipping {}: {error}", path.display());
            report.skipped(path, error.to_string());
            return None;
        };

        let entry = ManifestEntry::new(path, frame_count);
        log::info!("{entry}");
        report.succeeded(path, format!("{frame_count} frames"));
        Some(entry)
    }
}
