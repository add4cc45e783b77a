//! The per-platform release ledger (`releases.json`) and release pruning.
//!
//! A [`Ledger`] is loaded, mutated and persisted as one unit. Callers
//! serialize access per platform directory (see [`crate::ReleaseManager`]).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use shipyard_file_ops::{FileOpsError, list_files, remove_empty_dirs, write_atomic};
use shipyard_protocol::constants::{INDEX_FILE, RELEASES_FILE};
use shipyard_protocol::{BuildKey, ReleaseInfo, Releases};
use tracing::{debug, info, warn};

use crate::error::ReleaseError;

/// A loaded `releases.json` bound to its platform directory.
#[derive(Debug, Clone)]
pub struct Ledger {
    platform_dir: PathBuf,
    releases: Releases,
}

impl Ledger {
    /// Loads the ledger of a platform directory.
    ///
    /// A missing directory or file yields an empty ledger. A file that does
    /// not match the schema, or whose `current` is not among its builds,
    /// is rejected as corrupt.
    pub fn load(platform_dir: &Path) -> Result<Self, ReleaseError> {
        let path = platform_dir.join(RELEASES_FILE);
        let releases = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let releases: Releases =
                    serde_json::from_str(&content).map_err(|e| ReleaseError::CorruptLedger {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                releases
                    .validate()
                    .map_err(|e| ReleaseError::CorruptLedger {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                releases
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Releases::default(),
            Err(e) => return Err(FileOpsError::at("read", &path, e).into()),
        };

        Ok(Self {
            platform_dir: platform_dir.to_path_buf(),
            releases,
        })
    }

    pub fn releases(&self) -> &Releases {
        &self.releases
    }

    pub fn into_releases(self) -> Releases {
        self.releases
    }

    pub fn platform_dir(&self) -> &Path {
        &self.platform_dir
    }

    /// Makes `release` current and records it as the newest build.
    pub fn record_publish(&mut self, release: ReleaseInfo) -> Result<(), ReleaseError> {
        if self.releases.contains(&release.key) {
            return Err(ReleaseError::AlreadyReleased(release.key));
        }
        self.releases.current = Some(release.key.clone());
        self.releases.builds.insert(0, release);
        self.persist()
    }

    /// Points `current` at an already recorded release.
    ///
    /// The order of `builds` is left unchanged.
    pub fn record_rollback(&mut self, key: &BuildKey) -> Result<ReleaseInfo, ReleaseError> {
        if self.releases.is_current(key) {
            return Err(ReleaseError::AlreadyCurrent(key.clone()));
        }
        let release = self
            .releases
            .get(key)
            .cloned()
            .ok_or_else(|| ReleaseError::ReleaseNotFound(key.clone()))?;
        self.releases.current = Some(key.clone());
        self.persist()?;
        Ok(release)
    }

    /// Keeps the newest `keep` releases (by `releasedAt`) and deletes the
    /// files of the others.
    ///
    /// The current release is always kept. Files are deleted when no kept
    /// release's manifest lists them; `index.html` and `releases.json` are
    /// never deleted. If a kept manifest cannot be read, no files are
    /// deleted on this pass. Returns the removed keys.
    pub fn prune(&mut self, keep: usize) -> Result<Vec<BuildKey>, ReleaseError> {
        let keep = keep.max(1);
        let sorted = self.releases.sorted_newest_first();
        if sorted.len() <= keep {
            return Ok(Vec::new());
        }

        let mut kept = Vec::with_capacity(keep);
        let mut removed = Vec::new();
        for (i, release) in sorted.into_iter().enumerate() {
            if i < keep || self.releases.is_current(&release.key) {
                kept.push(release);
            } else {
                removed.push(release);
            }
        }

        if removed.is_empty() {
            return Ok(Vec::new());
        }

        match self.keep_set(&kept) {
            Some(keep_set) => self.sweep(&keep_set)?,
            None => warn!(
                platform_dir = %self.platform_dir.display(),
                "skipping release file cleanup: a kept manifest is unreadable"
            ),
        }

        let kept_keys: HashSet<&BuildKey> = kept.iter().map(|r| &r.key).collect();
        self.releases.builds.retain(|b| kept_keys.contains(&b.key));
        self.persist()?;

        let removed: Vec<BuildKey> = removed.into_iter().map(|r| r.key).collect();
        info!(
            platform_dir = %self.platform_dir.display(),
            keep,
            removed = ?removed.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "pruned old releases"
        );
        Ok(removed)
    }

    /// Reads the file manifest of a recorded release.
    pub fn read_manifest(&self, release: &ReleaseInfo) -> Result<Vec<String>, ReleaseError> {
        let path = self.platform_dir.join(&release.files);
        let content =
            std::fs::read_to_string(&path).map_err(|e| FileOpsError::at("read", &path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn keep_set(&self, kept: &[ReleaseInfo]) -> Option<HashSet<String>> {
        let mut keep_set = HashSet::new();
        for release in kept {
            keep_set.insert(release.index.clone());
            keep_set.insert(release.files.clone());
            match self.read_manifest(release) {
                Ok(files) => keep_set.extend(files),
                Err(e) => {
                    warn!(release = %release.key, error = %e, "unreadable release manifest");
                    return None;
                }
            }
        }
        Some(keep_set)
    }

    fn sweep(&self, keep_set: &HashSet<String>) -> Result<(), ReleaseError> {
        let mut deleted = 0u32;
        for file in list_files(&self.platform_dir)? {
            if file == INDEX_FILE || file == RELEASES_FILE || keep_set.contains(&file) {
                continue;
            }
            let path = self.platform_dir.join(&file);
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!(file = %file, "deleted release file");
                    deleted += 1;
                }
                Err(e) => warn!(file = %path.display(), error = %e, "failed to delete release file"),
            }
        }
        remove_empty_dirs(&self.platform_dir)?;
        debug!(deleted, "release file sweep done");
        Ok(())
    }

    fn persist(&self) -> Result<(), ReleaseError> {
        let path = self.platform_dir.join(RELEASES_FILE);
        let data = serde_json::to_vec_pretty(&self.releases)?;
        write_atomic(&path, &data)?;
        Ok(())
    }
}
