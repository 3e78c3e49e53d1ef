//! Application configuration management.
//!
//! Configuration is stored at `~/.config/questlog/config.json`. Two
//! environment variables (usually from a `.env` file) override it:
//! `QUESTLOG_API_URL` and `QUESTLOG_USERNAME`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::ExpiryPolicy;
use crate::storage::{FileStore, KeyValueStore, KeyringStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "questlog";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

pub const API_URL_ENV: &str = "QUESTLOG_API_URL";
pub const USERNAME_ENV: &str = "QUESTLOG_USERNAME";

/// Where the session credential is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    /// Owner-only file in the data directory.
    #[default]
    File,
    /// OS keychain.
    Keyring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub last_username: Option<String>,
    pub credential_backend: CredentialBackend,
    /// End the session only on 401/403 instead of 401/403/404/500.
    pub strict_session_expiry: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            last_username: None,
            credential_backend: CredentialBackend::default(),
            strict_session_expiry: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `QUESTLOG_API_URL` / `QUESTLOG_USERNAME` from the environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(USERNAME_ENV).ok(),
        )
    }

    fn with_overrides(mut self, api_url: Option<String>, username: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(name) = username.filter(|n| !n.trim().is_empty()) {
            self.last_username = Some(name.trim().to_string());
        }
        self
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        if self.strict_session_expiry {
            ExpiryPolicy::Strict
        } else {
            ExpiryPolicy::Coarse
        }
    }

    /// Store for the session credential, per `credential_backend`.
    pub fn credential_store(&self) -> Result<Arc<dyn KeyValueStore>> {
        Ok(match self.credential_backend {
            CredentialBackend::File => Arc::new(FileStore::new(Self::data_dir()?)?),
            CredentialBackend::Keyring => Arc::new(KeyringStore),
        })
    }

    /// Store for the active quest timer record. Always file-backed.
    pub fn timer_store(&self) -> Result<Arc<dyn KeyValueStore>> {
        Ok(Arc::new(FileStore::new(Self::data_dir()?)?))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn log_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("logs"))
    }
}
