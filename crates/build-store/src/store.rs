//! Build directory lifecycle: prepare, finalize, query.

use std::path::{Path, PathBuf};
use std::sync::PoisonError;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use shipyard_file_ops::{
    DirLocks, FileOpsError, copy_dir_all, is_empty_dir, numeric_subdirs, read_pointer, swap_pointer,
};
use shipyard_protocol::constants::{DEFAULT_DEPLOYMENTS_TO_KEEP, INDEX_FILE, PROD_DIR};
use shipyard_protocol::{
    BuildInfo, BuildKey, DeployInfo, DeploymentDetail, FinalizedDeployment, PreparedBuild,
};
use tracing::{debug, info, warn};

use crate::build_info::read_build_info;
use crate::error::StoreError;
use crate::layout::Layout;
use crate::retention;

/// Manages versioned build directories for every game under one root.
///
/// Mutations of one environment (prepare, finalize) are serialized so two
/// concurrent prepares cannot claim the same version.
#[derive(Debug)]
pub struct BuildStore {
    layout: Layout,
    deployments_to_keep: usize,
    locks: DirLocks,
}

impl BuildStore {
    /// Creates a store rooted at `root` with the default retention.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: Layout::new(root),
            deployments_to_keep: DEFAULT_DEPLOYMENTS_TO_KEEP,
            locks: DirLocks::default(),
        }
    }

    /// Sets how many deployed builds each environment keeps.
    pub fn with_retention(mut self, keep: usize) -> Self {
        self.deployments_to_keep = keep.max(1);
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Creates the build directory for `version` (or the next free version).
    ///
    /// The new directory is cloned from the highest existing non-empty build
    /// so the producer only needs to overlay changed files. Empty
    /// directories do not count as builds.
    pub fn prepare_build(
        &self,
        game: &str,
        environment: &str,
        version: Option<u64>,
    ) -> Result<PreparedBuild, StoreError> {
        if version == Some(0) {
            return Err(StoreError::InvalidVersion(
                "version must be a positive integer".into(),
            ));
        }

        let env_dir = self.layout.env_dir(game, environment)?;
        let handle = self.locks.handle(&env_dir);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);

        std::fs::create_dir_all(&env_dir)
            .map_err(|e| FileOpsError::at("create directory", &env_dir, e))?;

        let builds = existing_builds(&env_dir)?;
        let next = builds.last().map_or(1, |v| v + 1);
        let version = version.unwrap_or(next);

        if builds.contains(&version) {
            return Err(StoreError::DuplicateVersion { version, next });
        }

        let build_dir = env_dir.join(version.to_string());
        match builds.last() {
            Some(&source) => {
                let src = env_dir.join(source.to_string());
                let copied = copy_dir_all(&src, &build_dir)?;
                debug!(from = source, to = version, copied, "cloned previous build");
            }
            None => {
                std::fs::create_dir_all(&build_dir)
                    .map_err(|e| FileOpsError::at("create directory", &build_dir, e))?;
            }
        }

        info!(game, environment, version, "prepared build directory");

        Ok(PreparedBuild {
            new_build_version: version,
            new_build_dir: build_dir.display().to_string(),
            builds,
        })
    }

    /// Marks `version` as the environment's deployed build.
    ///
    /// Validates the directory, repoints `latest`, bumps the directory's
    /// modification time (best-effort) and prunes old builds.
    pub fn finalize_deployment(
        &self,
        game: &str,
        environment: &str,
        version: u64,
    ) -> Result<FinalizedDeployment, StoreError> {
        let env_dir = self.layout.env_dir(game, environment)?;
        let handle = self.locks.handle(&env_dir);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);

        let build_dir = env_dir.join(version.to_string());
        let info = validate_deployable(&build_dir)?;
        if info.version != version {
            warn!(
                game,
                environment,
                version,
                build_info_version = info.version,
                "build_info version does not match directory"
            );
        }

        let link = self.layout.latest_link(game, environment)?;
        swap_pointer(&link, Path::new(&version.to_string()))?;

        if let Err(e) = touch(&build_dir) {
            warn!(dir = %build_dir.display(), error = %e, "failed to update deployment time");
        }

        let pruned = match retention::prune(&env_dir, self.deployments_to_keep) {
            Ok(pruned) => pruned.into_iter().map(|p| p.version).collect(),
            Err(e) => {
                warn!(env_dir = %env_dir.display(), error = %e, "retention failed");
                Vec::new()
            }
        };

        info!(game, environment, version, "deployment finalized");

        Ok(FinalizedDeployment {
            build_version: version,
            build_dir: build_dir.display().to_string(),
            build_dir_alias: link.display().to_string(),
            pruned_versions: pruned,
        })
    }

    /// Lists deployed builds, newest first.
    ///
    /// Builds without a readable `build_info.json` are skipped.
    pub fn list_deployments(
        &self,
        game: &str,
        environment: &str,
    ) -> Result<Vec<DeployInfo>, StoreError> {
        let env_dir = self.existing_env_dir(game, environment)?;

        let mut versions = existing_builds(&env_dir)?;
        versions.reverse();

        let mut deployments = Vec::with_capacity(versions.len());
        for version in versions {
            let dir = env_dir.join(version.to_string());
            match read_build_info(&dir) {
                Ok(info) => deployments.push(deploy_info(version, &dir, info)),
                Err(StoreError::MissingFile { .. }) => {}
                Err(e) => warn!(dir = %dir.display(), error = %e, "skipping unreadable build"),
            }
        }

        Ok(deployments)
    }

    /// Resolves the environment's `latest` pointer.
    pub fn current_deployment(
        &self,
        game: &str,
        environment: &str,
    ) -> Result<DeployInfo, StoreError> {
        let link = self.layout.latest_link(game, environment)?;

        let target = read_pointer(&link)
            .map_err(|e| StoreError::Unreadable {
                path: link.display().to_string(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| StoreError::NoCurrentDeployment(environment.to_string()))?;

        let version = version_of(&target).ok_or_else(|| StoreError::Unreadable {
            path: target.display().to_string(),
            reason: "latest does not point at a numeric build directory".into(),
        })?;

        let info = read_build_info(&target).map_err(|e| StoreError::Unreadable {
            path: target.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(deploy_info(version, &target, info))
    }

    /// Returns one deployment and whether it is the environment's current one.
    pub fn deployment_detail(
        &self,
        game: &str,
        environment: &str,
        version: u64,
    ) -> Result<DeploymentDetail, StoreError> {
        let build_dir = self.layout.build_dir(game, environment, version)?;
        if !build_dir.is_dir() {
            return Err(StoreError::BuildNotFound(build_dir.display().to_string()));
        }

        let info = read_build_info(&build_dir).map_err(|e| match e {
            StoreError::InvalidBuildInfo { path, source } => StoreError::Unreadable {
                path,
                reason: source.to_string(),
            },
            other => other,
        })?;

        let is_current = self
            .current_deployment(game, environment)
            .is_ok_and(|current| current.version == version);

        Ok(DeploymentDetail {
            deployment: deploy_info(version, &build_dir, info),
            is_current,
        })
    }

    /// Lists the environments that exist for a game, sorted by name.
    pub fn list_environments(&self, game: &str) -> Result<Vec<String>, StoreError> {
        let game_dir = self.layout.game_dir(game)?;
        let entries = match std::fs::read_dir(&game_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(FileOpsError::at("read directory", &game_dir, e).into()),
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name != PROD_DIR && shipyard_protocol::is_valid_name(name))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Highest non-empty build version in an environment, if any.
    pub fn latest_version(
        &self,
        game: &str,
        environment: &str,
    ) -> Result<Option<u64>, StoreError> {
        let env_dir = self.layout.env_dir(game, environment)?;
        if !env_dir.is_dir() {
            return Ok(None);
        }
        Ok(existing_builds(&env_dir)?.last().copied())
    }

    /// Returns the directory and metadata of a deployable build.
    ///
    /// The build must contain both `build_info.json` and `index.html`.
    pub fn locate_deployable(
        &self,
        game: &str,
        key: &BuildKey,
    ) -> Result<(PathBuf, BuildInfo), StoreError> {
        let dir = self
            .layout
            .build_dir(game, key.environment(), key.version())?;
        let info = validate_deployable(&dir)?;
        Ok((dir, info))
    }

    /// Runs `f` on a deployable build with its environment locked, so a
    /// concurrent finalize cannot prune the build while `f` reads it.
    pub fn with_deployable<T, E, F>(&self, game: &str, key: &BuildKey, f: F) -> Result<T, E>
    where
        F: FnOnce(&Path, BuildInfo) -> Result<T, E>,
        E: From<StoreError>,
    {
        let env_dir = self.layout.env_dir(game, key.environment())?;
        let handle = self.locks.handle(&env_dir);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);
        let (dir, info) = self.locate_deployable(game, key)?;
        f(&dir, info)
    }

    fn existing_env_dir(&self, game: &str, environment: &str) -> Result<PathBuf, StoreError> {
        let env_dir = self.layout.env_dir(game, environment)?;
        if !env_dir.is_dir() {
            return Err(StoreError::EnvironmentNotFound {
                game: game.to_string(),
                environment: environment.to_string(),
            });
        }
        Ok(env_dir)
    }
}

/// Non-empty numeric build versions, ascending.
fn existing_builds(env_dir: &Path) -> Result<Vec<u64>, StoreError> {
    let mut builds = Vec::new();
    for version in numeric_subdirs(env_dir)? {
        if !is_empty_dir(&env_dir.join(version.to_string()))? {
            builds.push(version);
        }
    }
    builds.sort_unstable();
    Ok(builds)
}

fn validate_deployable(build_dir: &Path) -> Result<BuildInfo, StoreError> {
    if !build_dir.is_dir() {
        return Err(StoreError::BuildNotFound(build_dir.display().to_string()));
    }
    let info = read_build_info(build_dir)?;
    if !build_dir.join(INDEX_FILE).is_file() {
        return Err(StoreError::MissingFile {
            file: INDEX_FILE,
            dir: build_dir.display().to_string(),
        });
    }
    Ok(info)
}

fn version_of(dir: &Path) -> Option<u64> {
    let name = dir.file_name()?.to_str()?;
    if name.bytes().all(|b| b.is_ascii_digit()) {
        name.parse().ok()
    } else {
        None
    }
}

fn deploy_info(version: u64, dir: &Path, build_info: BuildInfo) -> DeployInfo {
    let modified = std::fs::metadata(dir)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH);
    DeployInfo {
        version,
        deployed_at: DateTime::<Utc>::from(modified),
        build_info,
    }
}

fn touch(dir: &Path) -> std::io::Result<()> {
    std::fs::File::open(dir)?.set_modified(SystemTime::now())
}
