//! Error types for the `framesift` crate.
//!
//! This module defines [`FramesiftError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry enough context to
//! diagnose a failed item from the log line alone: file paths, tool names,
//! exit codes, and the tool's own diagnostic output.

use std::{io::Error as IoError, path::PathBuf};

use serde_json::Error as JsonError;
use thiserror::Error;

/// The unified error type for all `framesift` operations.
///
/// Batch operations ([`Cataloger`](crate::Cataloger),
/// [`FrameExtractor`](crate::FrameExtractor),
/// [`FrameSelector`](crate::FrameSelector)) never surface a single item's
/// error to the caller; they record it in a
/// [`BatchReport`](crate::BatchReport) and continue. Only setup failures
/// are returned directly.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramesiftError {
    /// An input file or directory could not be opened.
    #[error("Failed to open {path}: {reason}")]
    FileOpen {
        /// Path that could not be opened.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// An external tool could not be started at all.
    #[error("Failed to launch {tool}: {reason}")]
    ToolLaunch {
        /// Program name or path.
        tool: String,
        /// Underlying reason the launch failed.
        reason: String,
    },

    /// An external tool ran but exited unsuccessfully.
    ///
    /// `stderr` is the tool's diagnostic output, verbatim.
    #[error("{tool} exited with {}:\n{stderr}", describe_status(*status))]
    ToolFailed {
        /// Program name or path.
        tool: String,
        /// Exit code, if the process exited normally.
        status: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// Probe output could not be interpreted.
    #[error("Failed to parse probe output for {path}: {reason}")]
    ProbeParse {
        /// The probed file.
        path: PathBuf,
        /// What was wrong with the output.
        reason: String,
    },

    /// A required metadata field was absent or unusable.
    #[error("Metadata for {path} is missing field `{field}`")]
    MissingField {
        /// The file the metadata belongs to.
        path: PathBuf,
        /// Name of the missing field.
        field: String,
    },

    /// A manifest line could not be split into a path and a frame count.
    #[error("Invalid manifest line {line_number}: {line:?}")]
    InvalidManifestLine {
        /// 1-based line number.
        line_number: usize,
        /// The offending line.
        line: String,
    },

    /// Metadata text was valid JSON but not a field → value object.
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// A frame folder has no sidecar file.
    #[error("No sidecar file at {0}")]
    SidecarMissing(PathBuf),

    /// A sidecar file exists but its metadata section is unusable.
    #[error("Failed to parse sidecar {path}: {reason}")]
    SidecarParse {
        /// The sidecar file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A time value was neither seconds nor `[HH:]MM:SS[.fff]`.
    #[error("Invalid timecode: {0:?}")]
    InvalidTimecode(String),

    /// A range's start value is greater than or equal to its end value.
    #[error("Invalid range: start ({start}) must be less than end ({end})")]
    InvalidRange {
        /// The start of the range.
        start: String,
        /// The end of the range.
        end: String,
    },

    /// A frame rate string was not `num/den` or a plain number.
    #[error("Invalid frame rate: {0:?}")]
    InvalidFrameRate(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] JsonError),
}

fn describe_status(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
