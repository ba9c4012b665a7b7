//! Client configuration.
//!
//! The backend base URL is assembled from a scheme/host/version triple so
//! staging and self-hosted deployments can be targeted without code changes.
//!
//! Configuration is stored at `~/.config/screenroom/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "screenroom";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Production API host
const DEFAULT_HOST: &str = "api.screenroom.app";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub scheme: String,
    pub host: String,
    pub version: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            host: DEFAULT_HOST.to_string(),
            version: "v1".to_string(),
        }
    }
}

impl ApiConfig {
    /// Base URL every backend path is appended to.
    pub fn base_url(&self) -> String {
        format!("{}://{}/{}", self.scheme, self.host, self.version)
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for durable session storage.
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
