//! Entry point for release operations on every platform of every game.

use std::sync::{Arc, PoisonError};

use shipyard_build_store::BuildStore;
use shipyard_protocol::constants::{DEFAULT_PUBLISH_ENVIRONMENTS, DEFAULT_RELEASES_TO_KEEP};
use shipyard_protocol::{BuildKey, ReleaseDetail, ReleaseInfo, ReleaseOutcome, Releases};
use shipyard_file_ops::DirLocks;
use tracing::warn;

use crate::error::ReleaseError;
use crate::ledger::Ledger;
use crate::publish::{self, PublishTarget};
use crate::rollback;

/// Publishes, rolls back and queries releases.
///
/// Every ledger mutation for one `(game, platform)` runs under that
/// platform's lock, so concurrent publishes and rollbacks cannot lose
/// each other's updates.
#[derive(Debug)]
pub struct ReleaseManager {
    store: Arc<BuildStore>,
    locks: DirLocks,
    releases_to_keep: usize,
    default_environments: Vec<String>,
}

impl ReleaseManager {
    pub fn new(store: Arc<BuildStore>) -> Self {
        Self {
            store,
            locks: DirLocks::default(),
            releases_to_keep: DEFAULT_RELEASES_TO_KEEP,
            default_environments: DEFAULT_PUBLISH_ENVIRONMENTS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    /// Sets how many releases each platform keeps.
    pub fn with_releases_to_keep(mut self, keep: usize) -> Self {
        self.releases_to_keep = keep.max(1);
        self
    }

    /// Sets the environments searched, in order, when publishing without a key.
    pub fn with_default_environments(mut self, environments: Vec<String>) -> Self {
        self.default_environments = environments;
        self
    }

    pub fn store(&self) -> &BuildStore {
        &self.store
    }

    /// Shared handle to the build store this manager publishes from.
    pub fn store_handle(&self) -> Arc<BuildStore> {
        Arc::clone(&self.store)
    }

    /// Returns the ledger with builds ordered newest first.
    pub fn list_releases(&self, game: &str, platform: &str) -> Result<Releases, ReleaseError> {
        let platform_dir = self.store.layout().platform_dir(game, platform)?;
        let mut releases = Ledger::load(&platform_dir)?.into_releases();
        releases.builds = releases.sorted_newest_first();
        Ok(releases)
    }

    pub fn current_release(&self, game: &str, platform: &str) -> Result<ReleaseInfo, ReleaseError> {
        let platform_dir = self.store.layout().platform_dir(game, platform)?;
        let ledger = Ledger::load(&platform_dir)?;
        ledger
            .releases()
            .current_release()
            .cloned()
            .ok_or(ReleaseError::NoCurrentRelease)
    }

    /// Returns one release with its file manifest.
    ///
    /// A missing or unreadable manifest yields an empty file list.
    pub fn release_detail(
        &self,
        game: &str,
        platform: &str,
        key: &str,
    ) -> Result<ReleaseDetail, ReleaseError> {
        let key = BuildKey::parse(key)?;
        let platform_dir = self.store.layout().platform_dir(game, platform)?;
        let ledger = Ledger::load(&platform_dir)?;

        let release = ledger
            .releases()
            .get(&key)
            .cloned()
            .ok_or_else(|| ReleaseError::ReleaseNotFound(key.clone()))?;

        let files_list = ledger.read_manifest(&release).unwrap_or_else(|e| {
            warn!(release = %key, error = %e, "release manifest unavailable");
            Vec::new()
        });

        Ok(ReleaseDetail {
            is_current: ledger.releases().is_current(&key),
            release,
            files_list,
        })
    }

    /// Publishes a deployed build as the platform's live release.
    ///
    /// Without a key, the latest build of the first default environment
    /// that has one is published.
    pub fn publish(
        &self,
        game: &str,
        platform: &str,
        key: Option<&str>,
    ) -> Result<ReleaseOutcome, ReleaseError> {
        let key = match key {
            Some(key) => BuildKey::parse(key)?,
            None => self.default_publish_key(game)?,
        };

        let layout = self.store.layout();
        let target = PublishTarget {
            game,
            platform_dir: layout.platform_dir(game, platform)?,
            staging_dir: layout.staging_dir(game, platform)?,
            releases_to_keep: self.releases_to_keep,
        };

        let handle = self.locks.handle(&target.platform_dir);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);
        publish::publish(&self.store, &target, key)
    }

    /// Makes an earlier release live again without copying files.
    ///
    /// Without a key, the release published just before the current one
    /// is chosen.
    pub fn rollback(
        &self,
        game: &str,
        platform: &str,
        key: Option<&str>,
    ) -> Result<ReleaseOutcome, ReleaseError> {
        let key = key.map(BuildKey::parse).transpose()?;
        let platform_dir = self.store.layout().platform_dir(game, platform)?;

        let handle = self.locks.handle(&platform_dir);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);
        rollback::rollback(&platform_dir, key)
    }

    fn default_publish_key(&self, game: &str) -> Result<BuildKey, ReleaseError> {
        for environment in &self.default_environments {
            if let Some(version) = self.store.latest_version(game, environment)? {
                return Ok(BuildKey::new(environment, version)?);
            }
        }
        Err(ReleaseError::NothingToPublish(self.default_environments.clone()))
    }
}
