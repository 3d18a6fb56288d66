//! Pipeline configuration.
//!
//! [`PipelineConfig`] is an immutable value threaded through every
//! component. It carries the scan filter, external tool settings, output
//! naming, the selection rule table, and progress reporting, so each of
//! those can be substituted in tests without touching module-level state.
//!
//! # Example
//!
//! ```
//! use framesift::{PipelineConfig, ScanFilter, ToolLogLevel};
//!
//! let config = PipelineConfig::new()
//!     .with_scan_filter(ScanFilter::new([".mov", ".mp4"]))
//!     .with_tool_log_level(ToolLogLevel::Error)
//!     .with_frame_extension("png");
//!
//! assert!(config.scan().accepts("take_01.MP4"));
//! assert_eq!(config.frame_pattern(), "%08d.png");
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::progress::{NoOpProgress, ProgressCallback};
use crate::selection::SelectionRules;
use crate::tools::ToolLogLevel;

/// Which directory entries count as source videos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFilter {
    /// Accepted file extensions including the dot, compared
    /// case-insensitively.
    pub extensions: Vec<String>,
    /// Names starting with this prefix are ignored (AppleDouble `._`
    /// resource-fork shadows by default).
    pub ignore_prefix: String,
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self::new([".mov"])
    }
}

impl ScanFilter {
    /// Filter accepting `extensions`, ignoring the default `._` prefix.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            ignore_prefix: "._".to_string(),
        }
    }

    /// Replace the ignored prefix. An empty prefix ignores nothing.
    #[must_use]
    pub fn with_ignore_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ignore_prefix = prefix.into();
        self
    }

    /// Whether a file named `file_name` should be cataloged.
    pub fn accepts(&self, file_name: &str) -> bool {
        if !self.ignore_prefix.is_empty() && file_name.starts_with(&self.ignore_prefix) {
            return false;
        }
        let lowered = file_name.to_lowercase();
        self.extensions
            .iter()
            .any(|extension| lowered.ends_with(&extension.to_lowercase()))
    }
}

/// External tool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// The transcoder binary.
    pub ffmpeg: PathBuf,
    /// The probe binary.
    pub ffprobe: PathBuf,
    /// Verbosity passed to the tools. `None` leaves ffmpeg at its default
    /// and runs ffprobe at `warning`.
    pub log_level: Option<ToolLogLevel>,
    /// The probe's `-show_entries` value.
    pub probe_entries: String,
    /// Extensions (with dot, case-insensitive) whose frame count is
    /// recomputed from frame rate × duration instead of trusted.
    pub recount_extensions: Vec<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            log_level: None,
            probe_entries: "stream=r_frame_rate,nb_frames,codec_name:format=duration".to_string(),
            recount_extensions: vec![".mkv".to_string()],
        }
    }
}

impl ToolConfig {
    /// Whether `path`'s frame count should be recomputed.
    pub fn needs_recount(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        self.recount_extensions
            .iter()
            .any(|extension| name.ends_with(&extension.to_lowercase()))
    }
}

/// Configuration for the whole pipeline.
///
/// Every field has a default:
/// `.mov` sources, 16-bit RGB TIFF frames named `%08d.tiff`, a
/// `source.txt` sidecar, a `tmp` scratch directory, `%03d` subfolders and
/// the default [`SelectionRules`].
#[derive(Clone)]
pub struct PipelineConfig {
    pub(crate) scan: ScanFilter,
    pub(crate) tools: ToolConfig,
    pub(crate) frame_extension: String,
    pub(crate) frame_pixel_format: String,
    pub(crate) frame_index_width: usize,
    pub(crate) sidecar_name: String,
    pub(crate) scratch_dir_name: String,
    pub(crate) subfolder_width: usize,
    pub(crate) rules: SelectionRules,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) batch_size: u64,
}

impl Debug for PipelineConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PipelineConfig")
            .field("scan", &self.scan)
            .field("tools", &self.tools)
            .field("frame_extension", &self.frame_extension)
            .field("frame_pixel_format", &self.frame_pixel_format)
            .field("frame_index_width", &self.frame_index_width)
            .field("sidecar_name", &self.sidecar_name)
            .field("scratch_dir_name", &self.scratch_dir_name)
            .field("subfolder_width", &self.subfolder_width)
            .field("rules", &self.rules)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            scan: ScanFilter::default(),
            tools: ToolConfig::default(),
            frame_extension: "tiff".to_string(),
            frame_pixel_format: "rgb48".to_string(),
            frame_index_width: 8,
            sidecar_name: "source.txt".to_string(),
            scratch_dir_name: "tmp".to_string(),
            subfolder_width: 3,
            rules: SelectionRules::default(),
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Replace the source scan filter.
    #[must_use]
    pub fn with_scan_filter(mut self, scan: ScanFilter) -> Self {
        self.scan = scan;
        self
    }

    /// Replace all tool settings.
    #[must_use]
    pub fn with_tools(mut self, tools: ToolConfig) -> Self {
        self.tools = tools;
        self
    }

    /// Use a different transcoder binary.
    #[must_use]
    pub fn with_ffmpeg(mut self, program: impl Into<PathBuf>) -> Self {
        self.tools.ffmpeg = program.into();
        self
    }

    /// Use a different probe binary.
    #[must_use]
    pub fn with_ffprobe(mut self, program: impl Into<PathBuf>) -> Self {
        self.tools.ffprobe = program.into();
        self
    }

    /// Set the tools' console verbosity.
    #[must_use]
    pub fn with_tool_log_level(mut self, level: ToolLogLevel) -> Self {
        self.tools.log_level = Some(level);
        self
    }

    /// Set the extracted frame file extension (without dot).
    #[must_use]
    pub fn with_frame_extension(mut self, extension: impl Into<String>) -> Self {
        self.frame_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Set the pixel format frames are dumped in.
    #[must_use]
    pub fn with_frame_pixel_format(mut self, pixel_format: impl Into<String>) -> Self {
        self.frame_pixel_format = pixel_format.into();
        self
    }

    /// Set the sidecar file name.
    #[must_use]
    pub fn with_sidecar_name(mut self, name: impl Into<String>) -> Self {
        self.sidecar_name = name.into();
        self
    }

    /// Set the scratch directory name created next to each source video.
    #[must_use]
    pub fn with_scratch_dir_name(mut self, name: impl Into<String>) -> Self {
        self.scratch_dir_name = name.into();
        self
    }

    /// Replace the selection rule table.
    #[must_use]
    pub fn with_rules(mut self, rules: SelectionRules) -> Self {
        self.rules = rules;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how often the progress callback fires (every N items).
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The source scan filter.
    pub fn scan(&self) -> &ScanFilter {
        &self.scan
    }

    /// The external tool settings.
    pub fn tools(&self) -> &ToolConfig {
        &self.tools
    }

    /// The selection rule table.
    pub fn rules(&self) -> &SelectionRules {
        &self.rules
    }

    /// The sidecar file name.
    pub fn sidecar_name(&self) -> &str {
        &self.sidecar_name
    }

    /// The extracted frame extension (without dot).
    pub fn frame_extension(&self) -> &str {
        &self.frame_extension
    }

    /// The transcoder's output pattern, e.g. `%08d.tiff`.
    pub fn frame_pattern(&self) -> String {
        format!("%0{}d.{}", self.frame_index_width, self.frame_extension)
    }

    /// File name of the 1-based frame `index`, e.g. `00000001.tiff`.
    pub fn frame_file_name(&self, index: usize) -> String {
        format!(
            "{index:0width$}.{}",
            self.frame_extension,
            width = self.frame_index_width
        )
    }

    /// Name of output subfolder `number`, e.g. `001`.
    pub fn subfolder_name(&self, number: usize) -> String {
        format!("{number:0width$}", width = self.subfolder_width)
    }

    /// Whether `path` has the extracted frame extension.
    pub(crate) fn is_frame_file(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case(self.frame_extension.as_str()))
    }

    /// Whether `name` looks like an output subfolder name.
    pub(crate) fn is_subfolder_name(&self, name: &str) -> bool {
        name.len() == self.subfolder_width && name.bytes().all(|byte| byte.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{PipelineConfig, ScanFilter, ToolConfig};

    #[test]
    fn scan_filter_skips_resource_forks() {
        let filter = ScanFilter::default();
        assert!(filter.accepts("A001_C002.mov"));
        assert!(filter.accepts("A001_C002.MOV"));
        assert!(!filter.accepts("._A001_C002.mov"));
        assert!(!filter.accepts("A001_C002.mp4"));
        assert!(!filter.accepts("notes.txt"));
    }

    #[test]
    fn empty_prefix_ignores_nothing() {
        let filter = ScanFilter::default().with_ignore_prefix("");
        assert!(filter.accepts("._A001.mov"));
    }

    #[test]
    fn recount_only_for_configured_containers() {
        let tools = ToolConfig::default();
        assert!(tools.needs_recount(Path::new("/videos/take.MKV")));
        assert!(!tools.needs_recount(Path::new("/videos/take.mov")));
    }

    #[test]
    fn naming_helpers() {
        let config = PipelineConfig::new();
        assert_eq!(config.frame_pattern(), "%08d.tiff");
        assert_eq!(config.frame_file_name(12), "00000012.tiff");
        assert_eq!(config.subfolder_name(2), "002");
        assert!(config.is_subfolder_name("005"));
        assert!(!config.is_subfolder_name("05"));
        assert!(config.is_frame_file(Path::new("00000001.TIFF")));
        assert!(!config.is_frame_file(Path::new("source.txt")));
    }
}
