//! Time-range trimming.
//!
//! [`RangeTrimmer`] cuts `[start, end)` out of one video by stream copy: no
//! re-encode, so cut points snap to whatever the container allows. It has
//! nothing to do with the frame pipeline and shares no state with it.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use framesift::{RangeTrimmer, SystemRunner, ToolConfig};
//!
//! let tools = ToolConfig::default();
//! let input = Path::new("take_07.mov");
//! let output = RangeTrimmer::default_output_path(input);
//! let summary = RangeTrimmer::new(&tools, &SystemRunner).trim(input, &output, "00:01:05", "95.5")?;
//! println!("{summary}");
//! # Ok::<(), framesift::FramesiftError>(())
//! ```

use std::ffi::OsString;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ToolConfig;
use crate::error::FramesiftError;
use crate::tools::ToolRunner;
use crate::utilities::{format_timecode, parse_timecode};

/// A finished trim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimSummary {
    /// The written file.
    pub output: PathBuf,
    /// Requested start.
    pub start: Duration,
    /// Requested end.
    pub end: Duration,
}

impl TrimSummary {
    /// Length of the requested range.
    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

impl Display for TrimSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} ({} -> {}, {})",
            self.output.display(),
            format_timecode(self.start),
            format_timecode(self.end),
            format_timecode(self.duration())
        )
    }
}

/// Extracts a time range from a video with stream copy.
pub struct RangeTrimmer<'a> {
    tools: &'a ToolConfig,
    runner: &'a dyn ToolRunner,
}

impl<'a> RangeTrimmer<'a> {
    /// Create a trimmer.
    pub fn new(tools: &'a ToolConfig, runner: &'a dyn ToolRunner) -> Self {
        Self { tools, runner }
    }

    /// `trimmed_<file name>`, relative to the working directory.
    pub fn default_output_path(input: &Path) -> PathBuf {
        let name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        PathBuf::from(format!("trimmed_{name}"))
    }

    /// Copy `[start, end)` of `input` into `output`, overwriting it.
    ///
    /// `start` and `end` accept raw seconds or `[HH:]MM:SS[.fff]`; they are
    /// validated here and handed to ffmpeg as written.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::FileOpen`] if `input` does not exist,
    /// [`FramesiftError::InvalidTimecode`] or [`FramesiftError::InvalidRange`]
    /// for bad time values, and [`FramesiftError::ToolFailed`] carrying
    /// ffmpeg's stderr if the copy fails.
    pub fn trim(
        &self,
        input: &Path,
        output: &Path,
        start: &str,
        end: &str,
    ) -> Result<TrimSummary, FramesiftError> {
        if !input.is_file() {
            return Err(FramesiftError::FileOpen {
                path: input.to_path_buf(),
                reason: "File does not exist".to_string(),
            });
        }

        let start_time = parse_timecode(start)?;
        let end_time = parse_timecode(end)?;
        if start_time >= end_time {
            return Err(FramesiftError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        log::info!(
            "Trimming {} from {} to {}",
            input.display(),
            format_timecode(start_time),
            format_timecode(end_time)
        );

        let args = self.trim_args(input, output, start.trim(), end.trim());
        self.runner
            .run(&self.tools.ffmpeg, &args)?
            .into_result(&self.tools.ffmpeg.display().to_string())?;

        log::info!("Trimmed video written to {}", output.display());
        Ok(TrimSummary {
            output: output.to_path_buf(),
            start: start_time,
            end: end_time,
        })
    }

    /// ffmpeg arguments for a stream-copy trim.
    pub fn trim_args(&self, input: &Path, output: &Path, start: &str, end: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-hide_banner".into()];
        if let Some(level) = self.tools.log_level {
            args.push("-v".into());
            args.push(level.as_arg().into());
        }
        args.extend(["-ss", start, "-to", end, "-i"].map(OsString::from));
        args.push(input.as_os_str().to_os_string());
        args.extend(["-c", "copy", "-avoid_negative_ts", "make_zero", "-y"].map(OsString::from));
        args.push(output.as_os_str().to_os_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use super::{RangeTrimmer, TrimSummary};

    #[test]
    fn default_output_lands_in_working_directory() {
        assert_eq!(
            RangeTrimmer::default_output_path(Path::new("/shoot/take_07.mov")),
            PathBuf::from("trimmed_take_07.mov")
        );
        assert_eq!(
            RangeTrimmer::default_output_path(Path::new("take_07.mov")),
            PathBuf::from("trimmed_take_07.mov")
        );
    }

    #[test]
    fn summary_display() {
        let summary = TrimSummary {
            output: PathBuf::from("out.mov"),
            start: Duration::from_secs(65),
            end: Duration::from_millis(95_500),
        };
        assert_eq!(
            summary.to_string(),
            "out.mov (00:01:05.000 -> 00:01:35.500, 00:00:30.500)"
        );
    }
}
