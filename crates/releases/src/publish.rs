//! Publish pipeline: `Validated -> Staged -> Committed`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use shipyard_build_store::{BuildStore, read_build_info};
use shipyard_file_ops::{FileOpsError, copy_dir_all, list_files, swap_pointer, write_atomic};
use shipyard_protocol::constants::{BUILD_INFO_FILE, INDEX_FILE};
use shipyard_protocol::{BuildInfo, BuildKey, ReleaseInfo, ReleaseOutcome};
use tracing::{debug, info, warn};

use crate::error::ReleaseError;
use crate::ledger::Ledger;

/// Directories a publish operates on.
pub(crate) struct PublishTarget<'a> {
    pub game: &'a str,
    pub platform_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub releases_to_keep: usize,
}

/// Publishes `key` to the target platform.
///
/// Must be called with the platform's ledger lock held. A failure before
/// the commit step leaves the ledger untouched; a stale staging directory
/// is replaced by the next publish.
pub(crate) fn publish(
    store: &BuildStore,
    target: &PublishTarget<'_>,
    key: BuildKey,
) -> Result<ReleaseOutcome, ReleaseError> {
    // Validated
    let mut ledger = Ledger::load(&target.platform_dir)?;
    if ledger.releases().contains(&key) {
        return Err(ReleaseError::AlreadyReleased(key));
    }

    // Staged, with the source environment locked against retention
    let build_info = store.with_deployable(target.game, &key, |source, _| {
        debug!(release = %key, source = %source.display(), "publish validated");
        stage(source, &target.staging_dir, &key)
    })?;
    debug!(release = %key, staging = %target.staging_dir.display(), "publish staged");

    // Committed
    let copied = copy_dir_all(&target.staging_dir, &target.platform_dir)?;
    std::fs::remove_dir_all(&target.staging_dir)
        .map_err(|e| FileOpsError::at("remove staging directory", &target.staging_dir, e))?;

    let release = ReleaseInfo::new(key.clone(), &build_info, Utc::now());
    ledger.record_publish(release.clone())?;

    // Repoint before pruning so `index.html` never names a swept file.
    swap_pointer(
        &target.platform_dir.join(INDEX_FILE),
        Path::new(&release.index),
    )?;
    let removed = ledger.prune(target.releases_to_keep)?;

    info!(
        game = target.game,
        release = %key,
        files = copied,
        pruned = removed.len(),
        "release published"
    );

    Ok(ReleaseOutcome {
        path: target.platform_dir.display().to_string(),
        release,
    })
}

/// Copies the build into the staging directory and turns it into release
/// assets. Returns the build metadata read from the copy.
fn stage(source: &Path, staging: &Path, key: &BuildKey) -> Result<BuildInfo, ReleaseError> {
    if staging.exists() {
        warn!(staging = %staging.display(), "removing stale staging directory");
        std::fs::remove_dir_all(staging)
            .map_err(|e| FileOpsError::at("remove staging directory", staging, e))?;
    }

    copy_dir_all(source, staging)?;

    let build_info = read_build_info(staging)?;
    let info_path = staging.join(BUILD_INFO_FILE);
    std::fs::remove_file(&info_path).map_err(|e| FileOpsError::at("remove", &info_path, e))?;

    let index = staging.join(INDEX_FILE);
    let renamed = staging.join(key.index_file());
    std::fs::rename(&index, &renamed).map_err(|e| FileOpsError::at("rename", &index, e))?;

    let manifest_name = key.files_manifest();
    let mut files = list_files(staging)?;
    files.push(manifest_name.clone());
    files.sort();
    write_atomic(&staging.join(&manifest_name), &to_tab_json(&files)?)?;

    Ok(build_info)
}

/// Serializes with tab indentation.
fn to_tab_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(out)
}
