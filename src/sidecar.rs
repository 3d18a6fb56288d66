//! Per-folder metadata sidecars.
//!
//! Each frame folder carries a plain-text sidecar (`source.txt` by default)
//! recording where the frames came from and the probe metadata they were
//! extracted with:
//!
//! ```text
//! [Original Path]
//! /media/card/A001_C002.mov
//!
//! [Metadata]
//! {
//!   "codec_name": "prores",
//!   "nb_frames": "300",
//!   ...
//! }
//! ```
//!
//! The selector re-reads the `[Metadata]` section to recover the nominal
//! frame count.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FramesiftError;
use crate::metadata::{FRAME_COUNT_FIELD, MetadataRecord};

const ORIGINAL_PATH_HEADER: &str = "[Original Path]";
const METADATA_HEADER: &str = "[Metadata]";

/// The parsed contents of a sidecar file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidecar {
    /// Resolved path of the source video.
    pub original_path: PathBuf,
    /// Probe metadata the frames were extracted with.
    pub metadata: MetadataRecord,
}

impl Sidecar {
    /// Create a sidecar.
    pub fn new(original_path: impl Into<PathBuf>, metadata: MetadataRecord) -> Self {
        Self {
            original_path: original_path.into(),
            metadata,
        }
    }

    /// Render the sidecar text.
    pub fn render(&self) -> String {
        format!(
            "{ORIGINAL_PATH_HEADER}\n{}\n\n{METADATA_HEADER}\n{}",
            self.original_path.display(),
            self.metadata.to_json_pretty()
        )
    }

    /// Write the sidecar to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::IoError`] if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), FramesiftError> {
        fs::write(path, self.render())?;
        Ok(())
    }

    /// Parse sidecar text. `path` is only used for error messages.
    ///
    /// Everything after the last `[Metadata]` header must be a JSON object.
    /// A missing `[Original Path]` section yields an empty path.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::SidecarParse`] if the metadata section is
    /// absent or not a JSON object.
    pub fn parse(path: &Path, text: &str) -> Result<Self, FramesiftError> {
        let parse_error = |reason: String| FramesiftError::SidecarParse {
            path: path.to_path_buf(),
            reason,
        };

        let (head, metadata_text) = text
            .rsplit_once(METADATA_HEADER)
            .ok_or_else(|| parse_error(format!("no {METADATA_HEADER} section")))?;
        let metadata = MetadataRecord::from_json_str(metadata_text.trim())
            .map_err(|e| parse_error(e.to_string()))?;

        let original_path = head
            .split_once(ORIGINAL_PATH_HEADER)
            .map(|(_, rest)| rest.trim())
            .unwrap_or_default();

        Ok(Self::new(original_path, metadata))
    }

    /// Read and parse the sidecar at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::SidecarMissing`] if there is no file at
    /// `path`, [`FramesiftError::IoError`] if it cannot be read, or
    /// [`FramesiftError::SidecarParse`] if it does not parse.
    pub fn read(path: &Path) -> Result<Self, FramesiftError> {
        if !path.is_file() {
            return Err(FramesiftError::SidecarMissing(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Self::parse(path, &text)
    }

    /// The nominal frame count recorded in the metadata.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::MissingField`] if the count is absent or
    /// not an integer.
    pub fn nominal_frame_count(&self) -> Result<i64, FramesiftError> {
        self.metadata
            .frame_count()
            .ok_or_else(|| FramesiftError::MissingField {
                path: self.original_path.clone(),
                field: FRAME_COUNT_FIELD.to_string(),
            })
    }
}
