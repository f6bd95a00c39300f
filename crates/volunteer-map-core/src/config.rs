//! Application configuration management.
//!
//! The configuration holds the API and image host endpoints, the image host
//! key, which uploader to use, and the last email used to log in.
//!
//! It is stored at `~/.config/volunteer-map/config.json`. Environment
//! variables prefixed with `VOLUNTEER_MAP_` override the file.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_BASE_URL;
use crate::imagehost::DEFAULT_IMAGE_HOST_URL;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "volunteer-map";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "VOLUNTEER_MAP_API_URL";
pub const ENV_IMAGE_HOST_URL: &str = "VOLUNTEER_MAP_IMAGE_HOST_URL";
pub const ENV_IMAGE_HOST_KEY: &str = "VOLUNTEER_MAP_IMAGE_HOST_KEY";
pub const ENV_IMAGE_PROVIDER: &str = "VOLUNTEER_MAP_IMAGE_PROVIDER";
pub const ENV_EMAIL: &str = "VOLUNTEER_MAP_EMAIL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageProvider {
    /// Third-party freeimage.host-compatible service
    #[default]
    FreeImage,
    /// The events API's own `/upload` endpoint
    Api,
}

impl std::str::FromStr for ImageProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "freeimage" => Ok(Self::FreeImage),
            "api" => Ok(Self::Api),
            other => Err(anyhow::anyhow!("Unknown image provider: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub image_host_url: String,
    pub image_host_key: Option<String>,
    pub image_provider: ImageProvider,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            image_host_url: DEFAULT_IMAGE_HOST_URL.to_string(),
            image_host_key: None,
            image_provider: ImageProvider::default(),
            last_email: None,
        }
    }
}

impl Config {
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

    /// Directory for cached snapshots, the session and log files
    pub fn data_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(url) = get(ENV_IMAGE_HOST_URL) {
            self.image_host_url = url;
        }
        if let Some(key) = get(ENV_IMAGE_HOST_KEY) {
            self.image_host_key = Some(key);
        }
        if let Some(provider) = get(ENV_IMAGE_PROVIDER) {
            self.image_provider = provider.parse()?;
        }
        if let Some(email) = get(ENV_EMAIL) {
            self.last_email = Some(email);
        }
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }
}
