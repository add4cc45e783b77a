use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::build_key::BuildKey;

/// Metadata the build producer writes into `build_info.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub version: u64,
    /// Epoch milliseconds.
    pub built_at: i64,
    pub built_at_readable: String,
    pub git_commit_hash: String,
    pub git_branch: String,
}

/// A single published release recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    pub key: BuildKey,
    /// `index_<key>.html`
    pub index: String,
    /// `files_<key>.json`
    pub files: String,
    pub released_at: DateTime<Utc>,
    pub built_at: String,
    pub git_branch: String,
    pub git_commit: String,
}

impl ReleaseInfo {
    /// Builds the ledger entry for publishing `key` from its build metadata.
    pub fn new(key: BuildKey, build_info: &BuildInfo, released_at: DateTime<Utc>) -> Self {
        Self {
            index: key.index_file(),
            files: key.files_manifest(),
            key,
            released_at,
            built_at: build_info.built_at_readable.clone(),
            git_branch: build_info.git_branch.clone(),
            git_commit: build_info.git_commit_hash.clone(),
        }
    }
}

/// The per-platform release ledger (`releases.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Releases {
    pub current: Option<BuildKey>,
    #[serde(default)]
    pub builds: Vec<ReleaseInfo>,
}

/// The ledger's `current` pointer names a key absent from `builds`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("current release {0} is not among the recorded builds")]
pub struct DanglingCurrent(pub BuildKey);

impl Releases {
    /// Checks that `current` refers to a recorded build.
    pub fn validate(&self) -> Result<(), DanglingCurrent> {
        match &self.current {
            Some(current) if !self.builds.is_empty() && !self.contains(current) => {
                Err(DanglingCurrent(current.clone()))
            }
            _ => Ok(()),
        }
    }

    pub fn contains(&self, key: &BuildKey) -> bool {
        self.builds.iter().any(|b| &b.key == key)
    }

    pub fn get(&self, key: &BuildKey) -> Option<&ReleaseInfo> {
        self.builds.iter().find(|b| &b.key == key)
    }

    /// The release `current` points at, if any.
    pub fn current_release(&self) -> Option<&ReleaseInfo> {
        self.current.as_ref().and_then(|key| self.get(key))
    }

    pub fn is_current(&self, key: &BuildKey) -> bool {
        self.current.as_ref() == Some(key)
    }

    /// Builds ordered by `releasedAt`, newest first.
    ///
    /// The sort is stable, so releases sharing a timestamp keep their
    /// ledger order.
    pub fn sorted_newest_first(&self) -> Vec<ReleaseInfo> {
        let mut builds = self.builds.clone();
        builds.sort_by(|a, b| b.released_at.cmp(&a.released_at));
        builds
    }
}

/// A deployed build as reported by the build store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployInfo {
    pub version: u64,
    /// Modification time of the build directory.
    pub deployed_at: DateTime<Utc>,
    pub build_info: BuildInfo,
}

/// A deployment plus whether `latest` points at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentDetail {
    #[serde(flatten)]
    pub deployment: DeployInfo,
    pub is_current: bool,
}

/// Result of preparing a new build directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedBuild {
    pub new_build_version: u64,
    pub new_build_dir: String,
    /// Versions that already existed, ascending.
    pub builds: Vec<u64>,
}

/// Result of finalizing a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedDeployment {
    pub build_version: u64,
    pub build_dir: String,
    /// Path of the environment's `latest` link.
    pub build_dir_alias: String,
    #[serde(default)]
    pub pruned_versions: Vec<u64>,
}

/// A release plus its manifest and whether it is live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDetail {
    #[serde(flatten)]
    pub release: ReleaseInfo,
    pub is_current: bool,
    pub files_list: Vec<String>,
}

/// Result of a publish or rollback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseOutcome {
    /// Platform release directory.
    pub path: String,
    pub release: ReleaseInfo,
}
