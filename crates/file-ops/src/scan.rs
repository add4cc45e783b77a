//! Directory listing helpers.

use std::path::Path;

use crate::FileOpsError;

/// Lists every regular file under `root`, recursively.
///
/// Paths are relative to `root`, use `/` as separator on every platform,
/// and are sorted.
pub fn list_files(root: &Path) -> Result<Vec<String>, FileOpsError> {
    let mut files = Vec::new();
    walk(root, root, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(root: &Path, current: &Path, files: &mut Vec<String>) -> Result<(), FileOpsError> {
    let entries =
        std::fs::read_dir(current).map_err(|e| FileOpsError::at("read directory", current, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| FileOpsError::at("read directory", current, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| FileOpsError::at("stat", &path, e))?;

        if file_type.is_dir() {
            walk(root, &path, files)?;
        } else {
            let rel = path
                .strip_prefix(root)
                .map_err(|e| FileOpsError::at("relativize", &path, std::io::Error::other(e)))?;
            files.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }

    Ok(())
}

/// Returns `true` if `path` is a directory with no entries.
pub fn is_empty_dir(path: &Path) -> Result<bool, FileOpsError> {
    let mut entries =
        std::fs::read_dir(path).map_err(|e| FileOpsError::at("read directory", path, e))?;
    Ok(entries.next().is_none())
}

/// Lists subdirectories of `dir` whose name is a base-10 integer.
///
/// Symlinks are not followed, so an environment's `latest` link is never
/// reported. Order is unspecified.
pub fn numeric_subdirs(dir: &Path) -> Result<Vec<u64>, FileOpsError> {
    let entries = std::fs::read_dir(dir).map_err(|e| FileOpsError::at("read directory", dir, e))?;

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FileOpsError::at("read directory", dir, e))?;
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(version) = name.parse::<u64>() {
                versions.push(version);
            }
        }
    }

    Ok(versions)
}
