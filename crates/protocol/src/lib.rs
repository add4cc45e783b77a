//! Shared data model for Shipyard.
//!
//! Build keys, the `build_info.json` and `releases.json` schemas, and the
//! response shapes returned by the build store and release pipeline.

pub mod build_key;
pub mod constants;
pub mod error;
pub mod types;

// Re-export primary types for convenience.
pub use build_key::{BuildKey, InvalidBuildKey, is_build_key, is_valid_name};
pub use error::ErrorKind;
pub use types::{
    BuildInfo, DanglingCurrent, DeployInfo, DeploymentDetail, FinalizedDeployment, PreparedBuild,
    ReleaseDetail, ReleaseInfo, ReleaseOutcome, Releases,
};
