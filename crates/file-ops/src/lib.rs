//! Filesystem primitives for build staging and release publishing.
//!
//! Provides path-name validation, recursive copy and listing, confined
//! deletion, atomic file writes, and atomic symlink pointer swaps.

mod atomic;
mod copy;
mod delete;
mod locks;
mod names;
mod pointer;
mod scan;

pub use atomic::write_atomic;
pub use copy::copy_dir_all;
pub use delete::{remove_dir_within, remove_empty_dirs};
pub use locks::DirLocks;
pub use names::validate_name;
pub use pointer::{read_pointer, swap_pointer};
pub use scan::{is_empty_dir, list_files, numeric_subdirs};

use std::path::Path;

/// Errors produced by filesystem operations.
#[derive(Debug, thiserror::Error)]
pub enum FileOpsError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {what} name: {name:?}")]
    InvalidName { what: &'static str, name: String },

    #[error("refusing to delete {path} outside {base}")]
    OutsideBase { path: String, base: String },
}

impl FileOpsError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wraps an I/O error as "failed to {action} {path}".
    pub fn at(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::io(format!("failed to {action} {}", path.display()), source)
    }

    /// Returns `true` if the underlying I/O error is `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
