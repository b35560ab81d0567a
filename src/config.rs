use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "jdocs.toml";
pub const BUNDLE_URL_ENV: &str = "JDOCS_BUNDLE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_store_root")]
    pub store_root: PathBuf,
    #[serde(default)]
    pub bundle_url: Option<String>,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_store_root() -> PathBuf {
    PathBuf::from("./javadocs")
}

fn default_fetch_timeout_secs() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_root: default_store_root(),
            bundle_url: None,
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl Config {
    /// Load `jdocs.toml` from the working directory, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        let mut config = if config_path.exists() {
            let content = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                path: config_path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: config_path.to_path_buf(),
                source,
            })?
        } else {
            debug!(path = %config_path.display(), "no config file, using defaults");
            Config::default()
        };

        if let Ok(url) = std::env::var(BUNDLE_URL_ENV) {
            config.bundle_url = Some(url);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        let root = std::path::absolute(&self.store_root)
            .map_err(|_| ConfigError::InvalidStoreRoot(self.store_root.clone()))?;
        if root.file_name().is_none() {
            return Err(ConfigError::InvalidStoreRoot(self.store_root.clone()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// The configured bundle identifier, ignoring blank values.
    pub fn bundle_identifier(&self) -> Option<&str> {
        self.bundle_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
