//! The frame-count manifest.
//!
//! Plain text, one video per line: `<path> : <frame count>`. Lines are
//! split on the first colon. Entries are not deduplicated; a path listed
//! twice is extracted twice.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FramesiftError;

/// One manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Source video path, as cataloged.
    pub path: PathBuf,
    /// Frame count reported by the probe, verbatim.
    pub frame_count: String,
}

impl ManifestEntry {
    /// Create an entry.
    pub fn new(path: impl Into<PathBuf>, frame_count: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            frame_count: frame_count.into(),
        }
    }

    /// Parse a manifest line. Returns `None` for lines without a colon or
    /// with an empty path (blank lines, stray text).
    pub fn parse_line(line: &str) -> Option<Self> {
        let (path, frame_count) = line.trim().split_once(':')?;
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        Some(Self::new(path, frame_count.trim()))
    }
}

impl Display for ManifestEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} : {}", self.path.display(), self.frame_count)
    }
}

/// Read every entry of the manifest at `path`, skipping lines that do not
/// parse.
///
/// # Errors
///
/// Returns [`FramesiftError::FileOpen`] if the file cannot be read.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>, FramesiftError> {
    let text = fs::read_to_string(path).map_err(|e| FramesiftError::FileOpen {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(text
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let entry = ManifestEntry::parse_line(line);
            if entry.is_none() && !line.trim().is_empty() {
                log::warn!(
                    "{}",
                    FramesiftError::InvalidManifestLine {
                        line_number: index + 1,
                        line: line.to_string(),
                    }
                );
            }
            entry
        })
        .collect())
}

/// Render entries as manifest text, one line each.
fn render_manifest(entries: &[ManifestEntry]) -> String {
    entries.iter().map(|entry| format!("{entry}\n")).collect()
}

/// Write `entries` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`FramesiftError::FileOpen`] if the file cannot be written.
pub fn write_manifest(path: &Path, entries: &[ManifestEntry]) -> Result<(), FramesiftError> {
    fs::write(path, render_manifest(entries)).map_err(|e| FramesiftError::FileOpen {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{ManifestEntry, read_manifest, write_manifest};

    #[test]
    fn parses_written_line() {
        let entry = ManifestEntry::new("/media/card/A001.mov", "240");
        let line = entry.to_string();
        assert_eq!(line, "/media/card/A001.mov : 240");
        assert_eq!(ManifestEntry::parse_line(&line), Some(entry));
    }

    #[test]
    fn splits_on_first_colon() {
        let entry = ManifestEntry::parse_line("clip.mov : 12 : extra").unwrap();
        assert_eq!(entry.path, PathBuf::from("clip.mov"));
        assert_eq!(entry.frame_count, "12 : extra");
    }

    #[test]
    fn rejects_lines_without_path() {
        assert_eq!(ManifestEntry::parse_line(""), None);
        assert_eq!(ManifestEntry::parse_line("no separator here"), None);
        assert_eq!(ManifestEntry::parse_line(" : 12"), None);
    }

    #[test]
    fn reads_file_keeping_duplicates() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let path = directory.path().join("list.txt");
        let entries = vec![
            ManifestEntry::new("a.mov", "10"),
            ManifestEntry::new("a.mov", "10"),
        ];
        write_manifest(&path, &entries).unwrap();
        assert_eq!(read_manifest(&path).unwrap(), entries);

        let mut text = std::fs::read_to_string(&path).unwrap();
        text.push_str("garbage\n\n");
        std::fs::write(&path, text).unwrap();
        assert_eq!(read_manifest(&path).unwrap(), entries);
    }
}
