use std::sync::Arc;

use shipyard_build_store::BuildStore;
use shipyard_releases::ReleaseManager;

/// Shared handles passed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<BuildStore>,
    pub releases: Arc<ReleaseManager>,
}

impl AppState {
    /// Wraps a release manager, sharing its build store.
    pub fn new(releases: ReleaseManager) -> Self {
        let releases = Arc::new(releases);
        Self {
            store: releases.store_handle(),
            releases,
        }
    }
}
