//! Source file permission normalization.
//!
//! Footage copied off camera cards or network shares is frequently
//! read-only or owner-inaccessible. Before a source is probed or copied,
//! [`ensure_read_write`] grants the owner read and write access.

use std::fs;
use std::path::Path;

use crate::error::FramesiftError;

/// Make `path` readable and writable by its owner, changing nothing if it
/// already is.
///
/// Returns `true` if the permissions were changed.
///
/// # Errors
///
/// Returns [`FramesiftError::FileOpen`] if the file's metadata cannot be
/// read, or [`FramesiftError::IoError`] if the permissions cannot be set.
pub fn ensure_read_write(path: &Path) -> Result<bool, FramesiftError> {
    let metadata = fs::metadata(path).map_err(|e| FramesiftError::FileOpen {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut permissions = metadata.permissions();

    #[cfg(unix)]
    let changed = {
        use std::os::unix::fs::PermissionsExt;

        let mode = permissions.mode();
        let wanted = mode | 0o600;
        if wanted != mode {
            permissions.set_mode(wanted);
            true
        } else {
            false
        }
    };

    #[cfg(not(unix))]
    let changed = {
        if permissions.readonly() {
            permissions.set_readonly(false);
            true
        } else {
            false
        }
    };

    if changed {
        fs::set_permissions(path, permissions)?;
        log::info!("Fixed permissions on {}", path.display());
    }

    Ok(changed)
}
