//! Configuration file storage.
//!
//! Reads and writes the YAML configuration files. Two scopes exist: a
//! system-wide file and a per-user file in the platform config directory.

use std::path::{Path, PathBuf};

use tokio::fs;

use super::Config;
use crate::error::ConfigError;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/chamictl/config.yaml";

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Get the default per-user configuration file path.
///
/// Uses the `directories` crate to find the platform-specific config
/// directory (`$XDG_CONFIG_HOME/chamictl` on Linux).
pub fn default_user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "chamictl")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Locations of the system and user configuration files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub system: PathBuf,
    pub user: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self {
            system: PathBuf::from(SYSTEM_CONFIG_PATH),
            user: default_user_config_path(),
        }
    }
}

/// File-backed configuration loader.
///
/// Takes its paths in the constructor so tests can point it at a temporary
/// directory.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    paths: ConfigPaths,
}

impl ConfigStore {
    pub fn new(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    /// Load and validate the configuration.
    ///
    /// With an explicit path only that file is read and it must exist.
    /// Otherwise the system and user files are merged, user over system;
    /// either may be missing.
    pub async fn load(&self, explicit: Option<&Path>) -> Result<Config, ConfigError> {
        let config = match explicit {
            Some(path) => read_config_file(path).await?,
            None => self.load_merged().await?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Merge the system and user files, user over system. Each file must
    /// name its clusters uniquely since merging folds duplicates together;
    /// the merged result is not otherwise validated.
    pub async fn load_merged(&self) -> Result<Config, ConfigError> {
        let mut config = read_optional(&self.paths.system).await?.unwrap_or_default();

        if let Some(ref user) = self.paths.user {
            if let Some(user_config) = read_optional(user).await? {
                config = config.merge(user_config);
            }
        }

        Ok(config)
    }
}

async fn read_optional(path: &Path) -> Result<Option<Config>, ConfigError> {
    match read_config_file(path).await {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            config.check_unique_clusters()?;
            Ok(Some(config))
        }
        Err(ConfigError::NotFound(_)) => {
            tracing::trace!(path = %path.display(), "config file not present");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Read one configuration file without validating it. An empty file is the
/// default configuration.
pub async fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path.to_path_buf()))
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if text.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a configuration file, creating parent directories as needed.
pub async fn write_config_file(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::EmptyPath);
    }

    let yaml = serde_yaml::to_string(config)?;
    ensure_parent(path).await?;

    fs::write(path, yaml)
        .await
        .map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(path = %path.display(), "wrote config file");
    Ok(())
}

/// Create an empty configuration file (and its parent directories) if it does
/// not already exist. Returns whether a file was created.
pub async fn create_if_not_exists(path: &Path) -> Result<bool, ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::EmptyPath);
    }

    if fs::try_exists(path).await.unwrap_or(false) {
        return Ok(false);
    }

    ensure_parent(path).await?;
    fs::write(path, b"")
        .await
        .map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(path = %path.display(), "created config file");
    Ok(true)
}

async fn ensure_parent(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
    }
    Ok(())
}
