//! Build store error types.

use shipyard_file_ops::FileOpsError;
use shipyard_protocol::ErrorKind;

/// Errors produced by build store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    FileOps(#[from] FileOpsError),

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("{0:?} is reserved and cannot be used as an environment")]
    ReservedEnvironment(String),

    #[error("{0:?} ends with the staging suffix and cannot be used as a platform")]
    ReservedPlatform(String),

    #[error("version {version} already exists, next available version is {next}")]
    DuplicateVersion { version: u64, next: u64 },

    #[error("environment {environment} not found for game {game}")]
    EnvironmentNotFound { game: String, environment: String },

    #[error("build directory not found: {0}")]
    BuildNotFound(String),

    #[error("missing {file} in {dir}")]
    MissingFile { file: &'static str, dir: String },

    #[error("invalid build info at {path}: {source}")]
    InvalidBuildInfo {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no current deployment for environment {0}")]
    NoCurrentDeployment(String),

    #[error("unreadable deployment at {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

impl StoreError {
    /// Classifies the error for callers mapping failures to responses.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileOps(FileOpsError::InvalidName { .. })
            | Self::InvalidVersion(_)
            | Self::ReservedEnvironment(_)
            | Self::ReservedPlatform(_)
            | Self::InvalidBuildInfo { .. } => ErrorKind::InvalidInput,
            Self::DuplicateVersion { .. } => ErrorKind::Conflict,
            Self::EnvironmentNotFound { .. }
            | Self::BuildNotFound(_)
            | Self::MissingFile { .. }
            | Self::NoCurrentDeployment(_) => ErrorKind::NotFound,
            Self::FileOps(_) | Self::Unreadable { .. } => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(
            StoreError::DuplicateVersion { version: 3, next: 4 }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            StoreError::BuildNotFound("/x".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            StoreError::InvalidVersion("0".into()).kind(),
            ErrorKind::InvalidInput
        );
        let name = FileOpsError::InvalidName {
            what: "game",
            name: "..".into(),
        };
        assert_eq!(StoreError::from(name).kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn duplicate_message_suggests_next() {
        let msg = StoreError::DuplicateVersion { version: 3, next: 8 }.to_string();
        assert!(msg.contains("next available version is 8"));
    }
}
