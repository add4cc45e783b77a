//! Recursive directory copy.

use std::path::Path;

use crate::FileOpsError;

/// Copies the contents of `src` into `dst`, creating `dst` if needed.
///
/// Merges into an existing destination: files present in both are
/// overwritten, files only in `dst` are left alone. Symlinks are followed.
/// Returns the number of files copied.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<u64, FileOpsError> {
    std::fs::create_dir_all(dst).map_err(|e| FileOpsError::at("create directory", dst, e))?;

    let entries = std::fs::read_dir(src).map_err(|e| FileOpsError::at("read directory", src, e))?;

    let mut copied = 0u64;
    for entry in entries {
        let entry = entry.map_err(|e| FileOpsError::at("read directory", src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let metadata =
            std::fs::metadata(&from).map_err(|e| FileOpsError::at("stat", &from, e))?;

        if metadata.is_dir() {
            copied += copy_dir_all(&from, &to)?;
        } else {
            std::fs::copy(&from, &to).map_err(|e| {
                FileOpsError::io(
                    format!("failed to copy {} to {}", from.display(), to.display()),
                    e,
                )
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}
