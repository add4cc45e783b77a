//! Release error types.

use shipyard_build_store::StoreError;
use shipyard_file_ops::FileOpsError;
use shipyard_protocol::{BuildKey, ErrorKind, InvalidBuildKey};

/// Errors produced by release ledger, publish and rollback operations.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    FileOps(#[from] FileOpsError),

    #[error(transparent)]
    InvalidKey(#[from] InvalidBuildKey),

    #[error("build {0} has already been released")]
    AlreadyReleased(BuildKey),

    #[error("build {0} is already the current release")]
    AlreadyCurrent(BuildKey),

    #[error("no previous release to roll back to")]
    NoPreviousBuild,

    #[error("release {0} not found")]
    ReleaseNotFound(BuildKey),

    #[error("no current release")]
    NoCurrentRelease,

    #[error("no build available to publish in environments {0:?}")]
    NothingToPublish(Vec<String>),

    #[error("corrupt release ledger at {path}: {reason}")]
    CorruptLedger { path: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReleaseError {
    /// Classifies the error for callers mapping failures to responses.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(e) => e.kind(),
            Self::FileOps(FileOpsError::InvalidName { .. }) | Self::InvalidKey(_) => {
                ErrorKind::InvalidInput
            }
            Self::AlreadyReleased(_) | Self::AlreadyCurrent(_) | Self::NoPreviousBuild => {
                ErrorKind::Conflict
            }
            Self::ReleaseNotFound(_) | Self::NoCurrentRelease | Self::NothingToPublish(_) => {
                ErrorKind::NotFound
            }
            Self::FileOps(_) | Self::CorruptLedger { .. } | Self::Json(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        let key = BuildKey::parse("master-1").unwrap();
        assert_eq!(ReleaseError::AlreadyReleased(key.clone()).kind(), ErrorKind::Conflict);
        assert_eq!(ReleaseError::AlreadyCurrent(key.clone()).kind(), ErrorKind::Conflict);
        assert_eq!(ReleaseError::NoPreviousBuild.kind(), ErrorKind::Conflict);
        assert_eq!(ReleaseError::ReleaseNotFound(key).kind(), ErrorKind::NotFound);
        assert_eq!(
            ReleaseError::InvalidKey(InvalidBuildKey("x".into())).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            ReleaseError::Store(StoreError::BuildNotFound("/b".into())).kind(),
            ErrorKind::NotFound
        );
    }
}
