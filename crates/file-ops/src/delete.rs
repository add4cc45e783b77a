//! Confined recursive deletion.

use std::path::Path;

use crate::FileOpsError;

/// Recursively deletes `path`, which must resolve to a directory strictly
/// inside `base`.
///
/// Safety checks:
/// 1. Both paths must resolve (canonicalize) successfully.
/// 2. The resolved path must be a directory.
/// 3. The resolved path must be below the resolved base, not equal to it.
pub fn remove_dir_within(base: &Path, path: &Path) -> Result<(), FileOpsError> {
    let base_canon =
        std::fs::canonicalize(base).map_err(|e| FileOpsError::at("resolve path", base, e))?;
    let abs = std::fs::canonicalize(path).map_err(|e| FileOpsError::at("resolve path", path, e))?;

    if !abs.is_dir() {
        return Err(FileOpsError::at(
            "delete",
            &abs,
            std::io::Error::other("not a directory"),
        ));
    }

    if abs == base_canon || !abs.starts_with(&base_canon) {
        return Err(FileOpsError::OutsideBase {
            path: abs.display().to_string(),
            base: base_canon.display().to_string(),
        });
    }

    std::fs::remove_dir_all(&abs).map_err(|e| FileOpsError::at("delete directory", &abs, e))?;

    tracing::debug!(path = %abs.display(), "deleted directory");
    Ok(())
}

/// Removes every empty directory below `root` (never `root` itself).
///
/// Returns the number of directories removed.
pub fn remove_empty_dirs(root: &Path) -> Result<u32, FileOpsError> {
    let entries = std::fs::read_dir(root).map_err(|e| FileOpsError::at("read directory", root, e))?;

    let mut removed = 0u32;
    for entry in entries.flatten() {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }
        let path = entry.path();
        removed += remove_empty_dirs(&path)?;
        if crate::is_empty_dir(&path)? {
            std::fs::remove_dir(&path).map_err(|e| FileOpsError::at("remove directory", &path, e))?;
            removed += 1;
        }
    }

    Ok(removed)
}
