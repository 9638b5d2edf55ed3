//! Config file loading
//!
//! The file format is picked from the extension: `.toml`, `.json`, and
//! `.yaml`/`.yml` when the `yaml` feature is enabled. Every field has a
//! default, so an empty file is a valid config.

use crate::error::{ConfigError, ConfigResult};
use crate::pagination::PaginationConfig;
use crate::storage::StorageConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable that overrides `storage.path`
pub const ENV_DATABASE_PATH: &str = "SEEKPAGE_DATABASE_PATH";

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pagination limits
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Database settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Validate every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.pagination.validate()
    }
}

/// Loads [`Config`] from files or strings
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load, apply environment overrides, and validate a config file
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Config> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::parse(path, &contents)?;
        Self::apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> ConfigResult<Config> {
        let config: Config = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Replace settings with values from the environment, when set
    pub fn apply_env_overrides(config: &mut Config) {
        if let Ok(path) = std::env::var(ENV_DATABASE_PATH) {
            if !path.is_empty() {
                debug!(path = %path, "Database path overridden from environment");
                config.storage.path = PathBuf::from(path);
            }
        }
    }

    fn parse(path: &Path, contents: &str) -> ConfigResult<Config> {
        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(contents).map_err(|e| parse_err(e.to_string())),
            Some("json") => serde_json::from_str(contents).map_err(|e| parse_err(e.to_string())),
            #[cfg(feature = "yaml")]
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(contents).map_err(|e| parse_err(e.to_string()))
            }
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}
