//! Media metadata probing through `ffprobe`.
//!
//! [`MediaProbe`] runs the probe binary on one file, asks for the entries
//! configured in [`ToolConfig::probe_entries`], and flattens the JSON
//! response into a [`MetadataRecord`]: `stream` entries come from the first
//! selected video stream, every other section (such as `format`) from the
//! top-level object of the same name.
//!
//! Some containers report an unreliable `nb_frames`. For files whose
//! extension is listed in [`ToolConfig::recount_extensions`], the frame count
//! is replaced by `r_frame_rate × duration`, rounded half-to-even.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{MediaProbe, SystemRunner, ToolConfig};
//!
//! let tools = ToolConfig::default();
//! let record = MediaProbe::new(&SystemRunner, &tools).probe("take_01.mov")?;
//! println!("{} frames", record.frame_count().unwrap_or(0));
//! # Ok::<(), framesift::FramesiftError>(())
//! ```

use std::ffi::OsString;
use std::path::Path;

use serde_json::Value;

use crate::config::ToolConfig;
use crate::error::FramesiftError;
use crate::metadata::{DURATION_FIELD, FRAME_COUNT_FIELD, FRAME_RATE_FIELD, MetadataRecord};
use crate::tools::{ToolLogLevel, ToolRunner};
use crate::utilities::frames_from_rate_and_duration;

/// Probes media files for stream and format metadata.
pub struct MediaProbe<'a> {
    runner: &'a dyn ToolRunner,
    tools: &'a ToolConfig,
}

impl<'a> MediaProbe<'a> {
    /// Create a probe using `runner` to launch the tool configured in
    /// `tools`.
    pub fn new(runner: &'a dyn ToolRunner, tools: &'a ToolConfig) -> Self {
        Self { runner, tools }
    }

    /// Probe `path` and return its flattened metadata.
    ///
    /// # Errors
    ///
    /// - [`FramesiftError::ToolLaunch`] if the probe cannot be started.
    /// - [`FramesiftError::ToolFailed`] if it exits unsuccessfully.
    /// - [`FramesiftError::ProbeParse`] if the output is not the expected
    ///   JSON shape (for example, the file has no video stream).
    /// - [`FramesiftError::MissingField`] if a recount is needed and the
    ///   frame rate or duration is unusable.
    pub fn probe<P: AsRef<Path>>(&self, path: P) -> Result<MetadataRecord, FramesiftError> {
        let path = path.as_ref();
        let args = probe_args(self.tools, path);
        let output = self
            .runner
            .run(&self.tools.ffprobe, &args)?
            .into_result(&self.tools.ffprobe.display().to_string())?;

        let mut record = parse_probe_output(path, &self.tools.probe_entries, &output.stdout)?;

        if self.tools.needs_recount(path) && self.tools.probe_entries.contains(FRAME_COUNT_FIELD) {
            let recounted = recount_frames(path, &record)?;
            log::debug!(
                "Recounted {}: {} -> {recounted} frames",
                path.display(),
                record.get(FRAME_COUNT_FIELD).unwrap_or("?"),
            );
            record.insert(FRAME_COUNT_FIELD, recounted.to_string());
        }

        Ok(record)
    }
}

/// Command-line arguments for probing `path`.
pub fn probe_args(tools: &ToolConfig, path: &Path) -> Vec<OsString> {
    let level = tools.log_level.unwrap_or(ToolLogLevel::Warning);
    let mut args: Vec<OsString> = [
        "-v",
        level.as_arg(),
        "-select_streams",
        "v:0",
        "-show_entries",
        tools.probe_entries.as_str(),
        "-of",
        "json=c=1",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(path.as_os_str().to_os_string());
    args
}

/// Flatten the probe's JSON output into a record.
///
/// `entries` is the `-show_entries` value the output was produced with;
/// its section names (`stream`, `format`, …) decide which objects are
/// merged, in order.
///
/// # Errors
///
/// Returns [`FramesiftError::ProbeParse`] if the output is not JSON or a
/// requested section is absent.
pub fn parse_probe_output(
    path: &Path,
    entries: &str,
    stdout: &str,
) -> Result<MetadataRecord, FramesiftError> {
    let parse_error = |reason: String| FramesiftError::ProbeParse {
        path: path.to_path_buf(),
        reason,
    };

    let json: Value = serde_json::from_str(stdout).map_err(|e| parse_error(e.to_string()))?;
    let mut record = MetadataRecord::new();

    for section in entries.split(':') {
        let key = section.split('=').next().unwrap_or_default().trim();
        if key.is_empty() {
            continue;
        }

        let source = if key == "stream" {
            json.get("streams").and_then(|streams| streams.get(0))
        } else {
            json.get(key)
        };

        let object = source
            .and_then(Value::as_object)
            .ok_or_else(|| parse_error(format!("no `{key}` section in probe output")))?;

        for (field, value) in MetadataRecord::from_json_object(object).iter() {
            record.insert(field, value);
        }
    }

    Ok(record)
}

/// Frame count implied by the record's frame rate and duration.
fn recount_frames(path: &Path, record: &MetadataRecord) -> Result<u64, FramesiftError> {
    let missing = |field: &str| FramesiftError::MissingField {
        path: path.to_path_buf(),
        field: field.to_string(),
    };

    let frames_per_second = record
        .frames_per_second()
        .ok_or_else(|| missing(FRAME_RATE_FIELD))?;
    let duration = record
        .duration_seconds()
        .ok_or_else(|| missing(DURATION_FIELD))?;

    Ok(frames_from_rate_and_duration(frames_per_second, duration))
}
