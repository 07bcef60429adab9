//! Configuration management for learnops
//!
//! Config files are stored in platform-appropriate locations:
//! - Linux: ~/.config/learnops/
//! - macOS: ~/Library/Application Support/learnops/
//! - Windows: %APPDATA%\learnops\
//!
//! Environment variables override the file after loading:
//! `LEARNOPS_API_URL`, `LEARNOPS_LIVEKIT_URL`, `LEARNOPS_TIMEOUT_MS`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const ENV_API_URL: &str = "LEARNOPS_API_URL";
pub const ENV_LIVEKIT_URL: &str = "LEARNOPS_LIVEKIT_URL";
pub const ENV_TIMEOUT_MS: &str = "LEARNOPS_TIMEOUT_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoDirFound,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend and video transport endpoints
    #[serde(default)]
    pub api: ApiConfig,

    /// Client configuration (storage location, tui)
    #[serde(default)]
    pub client: ClientConfig,
}

/// Remote endpoints used by the api client and room services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend origin, all REST paths are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Real-time video transport URL stamped onto room/token responses
    #[serde(default = "default_livekit_url")]
    pub livekit_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Client-side configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Override for the persistent key-value store file
    pub storage_path: Option<PathBuf>,

    /// TUI-specific settings
    #[serde(default)]
    pub tui: TuiConfig,
}

/// TUI-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Enable mouse support
    #[serde(default = "default_true")]
    pub mouse: bool,
}

fn default_base_url() -> String {
    crate::DEFAULT_API_URL.to_string()
}
fn default_livekit_url() -> String {
    crate::DEFAULT_LIVEKIT_URL.to_string()
}
fn default_timeout_ms() -> u64 {
    crate::DEFAULT_TIMEOUT_MS
}
fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            livekit_url: default_livekit_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            mouse: true,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Get config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join("learnops"))
            .ok_or(ConfigError::NoDirFound)
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from default location, then apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        let config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        Ok(config.with_env_overrides())
    }

    /// Load config from specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save config to specific path
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `LEARNOPS_*` environment variables on top of this config
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(url) = lookup(ENV_LIVEKIT_URL).filter(|v| !v.is_empty()) {
            self.api.livekit_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            match raw.parse::<u64>() {
                Ok(ms) => self.api.timeout_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid {}={:?}", ENV_TIMEOUT_MS, raw),
            }
        }
        self
    }

    /// Location of the persistent key-value store
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.client.storage_path.clone().or_else(|| {
            dirs::data_dir().map(|d| d.join("learnops").join("storage.json"))
        })
    }
}
