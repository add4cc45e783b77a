//! Deployment retention: keep the newest builds, delete the rest.

use std::path::{Path, PathBuf};

use shipyard_file_ops::{numeric_subdirs, read_pointer, remove_dir_within};
use shipyard_protocol::constants::LATEST_LINK;
use tracing::{info, warn};

use crate::error::StoreError;

/// A build directory removed by [`prune`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrunedBuild {
    pub version: u64,
    pub path: PathBuf,
}

/// Deletes every numeric build directory in `env_dir` beyond the newest
/// `keep` versions.
///
/// `keep` is at least 1. The build `latest` points at is never deleted,
/// even when it falls outside the kept window.
pub fn prune(env_dir: &Path, keep: usize) -> Result<Vec<PrunedBuild>, StoreError> {
    let keep = keep.max(1);

    let mut versions = numeric_subdirs(env_dir)?;
    versions.sort_unstable_by(|a, b| b.cmp(a));

    let current = current_version(env_dir);

    let mut pruned = Vec::new();
    for version in versions.into_iter().skip(keep) {
        if current == Some(version) {
            warn!(env_dir = %env_dir.display(), version, "retention skipped the current deployment");
            continue;
        }
        let path = env_dir.join(version.to_string());
        remove_dir_within(env_dir, &path)?;
        pruned.push(PrunedBuild { version, path });
    }

    if !pruned.is_empty() {
        info!(
            env_dir = %env_dir.display(),
            keep,
            pruned = pruned.len(),
            "pruned old deployments"
        );
    }

    Ok(pruned)
}

fn current_version(env_dir: &Path) -> Option<u64> {
    read_pointer(&env_dir.join(LATEST_LINK))
        .ok()
        .flatten()
        .and_then(|target| target.file_name()?.to_str()?.parse().ok())
}
