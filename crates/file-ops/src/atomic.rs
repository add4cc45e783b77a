//! Atomic file replacement.

use std::io::Write;
use std::path::Path;

use crate::FileOpsError;

/// Writes `data` to `target` by writing a temporary file in the same
/// directory and renaming it into place.
///
/// Readers see either the old contents or the new contents, never a
/// partially written file.
pub fn write_atomic(target: &Path, data: &[u8]) -> Result<(), FileOpsError> {
    let parent = target.parent().ok_or_else(|| {
        FileOpsError::at(
            "write",
            target,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no parent"),
        )
    })?;
    std::fs::create_dir_all(parent).map_err(|e| FileOpsError::at("create directory", parent, e))?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| FileOpsError::at("create temp file in", parent, e))?;
    temp.write_all(data)
        .map_err(|e| FileOpsError::at("write temp file for", target, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| FileOpsError::at("sync temp file for", target, e))?;

    temp.persist(target)
        .map_err(|e| FileOpsError::at("rename temp file to", target, e.error))?;

    Ok(())
}
