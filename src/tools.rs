//! External tool invocation.
//!
//! All decoding, encoding and inspection is delegated to the `ffmpeg` and
//! `ffprobe` binaries. This module is the single seam through which the rest
//! of the crate runs them: a [`ToolRunner`] takes a program and its
//! arguments, blocks until the process exits, and hands back a
//! [`ToolOutput`]. The default [`SystemRunner`] spawns real processes; tests
//! substitute a scripted runner.
//!
//! It also carries [`ToolLogLevel`], which maps onto the tools' own `-v`
//! verbosity flag. That controls **the tools' console output**, not the
//! Rust-side messages emitted through the `log` crate.
//!
//! # Example
//!
//! ```no_run
//! use std::ffi::OsString;
//! use std::path::Path;
//!
//! use framesift::{SystemRunner, ToolRunner};
//!
//! let output = SystemRunner.run(Path::new("ffprobe"), &[OsString::from("-version")])?;
//! assert!(output.success);
//! # Ok::<(), framesift::FramesiftError>(())
//! ```

use std::{
    ffi::OsString,
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
    process::{Command, Stdio},
};

use crate::error::FramesiftError;

/// Verbosity passed to ffmpeg/ffprobe via `-v`.
///
/// # Ordering (most verbose → most quiet)
///
/// `Trace` > `Debug` > `Verbose` > `Info` > `Warning` > `Error` > `Fatal` > `Panic` > `Quiet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolLogLevel {
    /// Print no output at all.
    Quiet,
    /// Only log conditions the tool cannot recover from and aborts on.
    Panic,
    /// Only log unrecoverable errors.
    Fatal,
    /// Log recoverable errors.
    Error,
    /// Log warnings.
    Warning,
    /// Log informational messages (the tools' default).
    Info,
    /// Log verbose informational messages.
    Verbose,
    /// Log debugging messages.
    Debug,
    /// Extremely verbose tracing output.
    Trace,
}

impl ToolLogLevel {
    /// The value accepted by the tools' `-v` flag.
    pub fn as_arg(self) -> &'static str {
        match self {
            ToolLogLevel::Quiet => "quiet",
            ToolLogLevel::Panic => "panic",
            ToolLogLevel::Fatal => "fatal",
            ToolLogLevel::Error => "error",
            ToolLogLevel::Warning => "warning",
            ToolLogLevel::Info => "info",
            ToolLogLevel::Verbose => "verbose",
            ToolLogLevel::Debug => "debug",
            ToolLogLevel::Trace => "trace",
        }
    }

    /// Parse a level name, accepting `warn` as an alias for `warning`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Some(ToolLogLevel::Quiet),
            "panic" => Some(ToolLogLevel::Panic),
            "fatal" => Some(ToolLogLevel::Fatal),
            "error" => Some(ToolLogLevel::Error),
            "warning" | "warn" => Some(ToolLogLevel::Warning),
            "info" => Some(ToolLogLevel::Info),
            "verbose" => Some(ToolLogLevel::Verbose),
            "debug" => Some(ToolLogLevel::Debug),
            "trace" => Some(ToolLogLevel::Trace),
            _ => None,
        }
    }
}

impl Display for ToolLogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_arg())
    }
}

/// The result of running an external tool to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, if the process exited normally.
    pub status: Option<i32>,
    /// Whether the process reported success.
    pub success: bool,
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
}

impl ToolOutput {
    /// Convert a non-zero exit into [`FramesiftError::ToolFailed`].
    ///
    /// The tool's stderr is carried verbatim.
    pub fn into_result(self, tool: &str) -> Result<Self, FramesiftError> {
        if self.success {
            Ok(self)
        } else {
            Err(FramesiftError::ToolFailed {
                tool: tool.to_string(),
                status: self.status,
                stderr: self.stderr,
            })
        }
    }
}

/// Something that can run an external program and wait for it.
///
/// Runs are blocking and have no timeout: a hung tool hangs the caller.
pub trait ToolRunner {
    /// Run `program` with `args`, capturing its output.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::ToolLaunch`] if the process cannot be
    /// started. A process that starts and then fails is **not** an error
    /// here; inspect [`ToolOutput::success`] or call
    /// [`ToolOutput::into_result`].
    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, FramesiftError>;
}

/// Runs tools as child processes via [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, FramesiftError> {
        log::debug!("Running {}", render_command(program, args));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| FramesiftError::ToolLaunch {
                tool: program.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(ToolOutput {
            status: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Render a command line for logs.
pub fn render_command(program: &Path, args: &[OsString]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

/// Check whether `program` can be launched, by running `<program> -version`.
pub fn tool_available(runner: &dyn ToolRunner, program: &Path) -> bool {
    runner
        .run(program, &[OsString::from("-version")])
        .is_ok_and(|output| output.success)
}
