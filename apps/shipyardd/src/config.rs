//! Daemon configuration.
//!
//! Reads TOML from `~/.config/shipyard/shipyard.toml` unless another path
//! is given. A missing file is created with the defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use shipyard_protocol::constants::{
    DEFAULT_DEPLOYMENTS_TO_KEEP, DEFAULT_PUBLISH_ENVIRONMENTS, DEFAULT_RELEASES_TO_KEEP, PROD_DIR,
};
use shipyard_protocol::is_valid_name;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one subdirectory per game.
    pub root_dir: PathBuf,
    pub listen: SocketAddr,
    pub deployments_to_keep: usize,
    pub releases_to_keep: usize,
    /// Environments tried, in order, when publishing without a build key.
    pub default_environments: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("/var/lib/shipyard"),
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            deployments_to_keep: DEFAULT_DEPLOYMENTS_TO_KEEP,
            releases_to_keep: DEFAULT_RELEASES_TO_KEEP,
            default_environments: DEFAULT_PUBLISH_ENVIRONMENTS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Loads the config at `path`, or the default location when `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };

        if !path.exists() {
            let config = Self::default();
            config.save(&path)?;
            tracing::info!(path = %path.display(), "wrote default configuration");
            return Ok(config);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.root_dir.as_os_str().is_empty() {
            bail!("root_dir must not be empty");
        }
        if self.deployments_to_keep == 0 {
            bail!("deployments_to_keep must be at least 1");
        }
        if self.releases_to_keep == 0 {
            bail!("releases_to_keep must be at least 1");
        }
        for env in &self.default_environments {
            if !is_valid_name(env) || env == PROD_DIR {
                bail!("invalid default environment {env:?}");
            }
        }
        Ok(())
    }
}

fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(config_base_dir()?.join("shipyard").join("shipyard.toml"))
}

fn config_base_dir() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA").context("APPDATA is not set")?;
        Ok(PathBuf::from(appdata))
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(xdg));
        }
        let home = std::env::var("HOME").context("HOME is not set")?;
        Ok(PathBuf::from(home).join(".config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("shipyard.toml");

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config, Config::default());
        assert!(path.is_file());
        assert_eq!(Config::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("shipyard.toml");
        std::fs::write(
            &path,
            "root_dir = \"/data/games\"\nreleases_to_keep = 2\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.root_dir, PathBuf::from("/data/games"));
        assert_eq!(config.releases_to_keep, 2);
        assert_eq!(config.deployments_to_keep, DEFAULT_DEPLOYMENTS_TO_KEEP);
        assert_eq!(config.default_environments, ["master", "main"]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("shipyard.toml");
        std::fs::write(&path, "listen = 42").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(Config::default().validate().is_ok());

        let zero_keep = Config {
            releases_to_keep: 0,
            ..Config::default()
        };
        assert!(zero_keep.validate().is_err());

        let prod = Config {
            default_environments: vec!["prod".into()],
            ..Config::default()
        };
        assert!(prod.validate().is_err());

        let traversal = Config {
            default_environments: vec!["../x".into()],
            ..Config::default()
        };
        assert!(traversal.validate().is_err());
    }
}
