//! Error classification shared across crates.

use serde::{Deserialize, Serialize};

/// Broad category of a failure, independent of which crate produced it.
///
/// The HTTP layer maps each kind to a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Missing directory, file, or ledger entry.
    NotFound,
    /// Malformed key, non-positive version, schema-invalid metadata.
    InvalidInput,
    /// Duplicate version, already released, already current, no previous.
    Conflict,
    /// I/O failures and corrupt on-disk state.
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InvalidInput => "INVALID_INPUT",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL",
        }
    }
}
