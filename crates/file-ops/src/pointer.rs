//! Symlink pointers swapped atomically.
//!
//! A pointer (an environment's `latest`, a platform's `index.html`) is a
//! symlink with a target relative to its own directory. Repointing creates
//! the new link under a unique temporary name and renames it over the old
//! one, so readers never observe a missing link.

use std::path::{Path, PathBuf};

use crate::FileOpsError;

/// Atomically points `link` at `target`.
///
/// `target` is stored as given and is normally relative to `link`'s
/// parent directory.
pub fn swap_pointer(link: &Path, target: &Path) -> Result<(), FileOpsError> {
    let parent = link.parent().ok_or_else(|| {
        FileOpsError::at(
            "repoint",
            link,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "link has no parent"),
        )
    })?;
    let name = link
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = parent.join(format!(".{name}.{}.tmp", uuid::Uuid::new_v4().simple()));

    create_link(&parent.join(target), target, &temp)?;

    if let Err(e) = std::fs::rename(&temp, link) {
        let _ = std::fs::remove_file(&temp);
        return Err(FileOpsError::at("rename pointer to", link, e));
    }

    tracing::debug!(link = %link.display(), target = %target.display(), "pointer swapped");
    Ok(())
}

#[cfg(unix)]
fn create_link(_resolved: &Path, target: &Path, temp: &Path) -> Result<(), FileOpsError> {
    std::os::unix::fs::symlink(target, temp).map_err(|e| FileOpsError::at("create symlink", temp, e))
}

#[cfg(windows)]
fn create_link(resolved: &Path, target: &Path, temp: &Path) -> Result<(), FileOpsError> {
    let result = if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, temp)
    } else {
        std::os::windows::fs::symlink_file(target, temp)
    };
    result.map_err(|e| FileOpsError::at("create symlink", temp, e))
}

/// Resolves `link` to the canonical path it points at.
///
/// Returns `Ok(None)` if no link (or file) exists at `link`.
pub fn read_pointer(link: &Path) -> Result<Option<PathBuf>, FileOpsError> {
    match std::fs::symlink_metadata(link) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(FileOpsError::at("stat", link, e)),
    }

    std::fs::canonicalize(link)
        .map(Some)
        .map_err(|e| FileOpsError::at("resolve pointer", link, e))
}
