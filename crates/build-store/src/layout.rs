//! Path layout under the store root.
//!
//! ```text
//! <root>/<game>/<environment>/<version>/    build directories
//! <root>/<game>/<environment>/latest        -> <version>
//! <root>/<game>/prod/<platform>/            platform release directory
//! <root>/<game>/prod/<platform>_temp/       publish staging directory
//! ```

use std::path::{Path, PathBuf};

use shipyard_file_ops::validate_name;
use shipyard_protocol::constants::{LATEST_LINK, PROD_DIR, STAGING_SUFFIX};

use crate::error::StoreError;

/// Resolves validated paths below a store root.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn game_dir(&self, game: &str) -> Result<PathBuf, StoreError> {
        validate_name("game", game)?;
        Ok(self.root.join(game))
    }

    /// `<root>/<game>/<environment>`; `prod` is rejected.
    pub fn env_dir(&self, game: &str, environment: &str) -> Result<PathBuf, StoreError> {
        validate_name("environment", environment)?;
        if environment == PROD_DIR {
            return Err(StoreError::ReservedEnvironment(environment.to_string()));
        }
        Ok(self.game_dir(game)?.join(environment))
    }

    pub fn build_dir(
        &self,
        game: &str,
        environment: &str,
        version: u64,
    ) -> Result<PathBuf, StoreError> {
        Ok(self.env_dir(game, environment)?.join(version.to_string()))
    }

    pub fn latest_link(&self, game: &str, environment: &str) -> Result<PathBuf, StoreError> {
        Ok(self.env_dir(game, environment)?.join(LATEST_LINK))
    }

    /// `<root>/<game>/prod/<platform>`; names ending in `_temp` are rejected
    /// so no platform shares a directory with another's staging area.
    pub fn platform_dir(&self, game: &str, platform: &str) -> Result<PathBuf, StoreError> {
        check_platform(platform)?;
        Ok(self.game_dir(game)?.join(PROD_DIR).join(platform))
    }

    pub fn staging_dir(&self, game: &str, platform: &str) -> Result<PathBuf, StoreError> {
        check_platform(platform)?;
        Ok(self
            .game_dir(game)?
            .join(PROD_DIR)
            .join(format!("{platform}{STAGING_SUFFIX}")))
    }
}

fn check_platform(platform: &str) -> Result<(), StoreError> {
    validate_name("platform", platform)?;
    if platform.ends_with(STAGING_SUFFIX) {
        return Err(StoreError::ReservedPlatform(platform.to_string()));
    }
    Ok(())
}
