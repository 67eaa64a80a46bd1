//! Client configuration.
//!
//! Values are resolved in this order: command-line flag, environment
//! (`NOTEKEEPER_API_URL`), `config.toml` in the platform config directory,
//! built-in defaults.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that selects the API base address.
pub const API_URL_ENV: &str = "NOTEKEEPER_API_URL";

/// Local development address used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Request timeout applied to every call (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base address of the notes API.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Where the persisted session lives. `None` = platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            data_dir: None,
        }
    }
}

impl Config {
    /// Load `config.toml` from the platform config directory and apply the
    /// environment override.
    pub fn load() -> Result<Self> {
        let mut config = match project_dirs() {
            Some(dirs) => Self::from_file(&dirs.config_dir().join(CONFIG_FILE))?,
            None => Self::default(),
        };
        config.apply_env_override(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Replace `api_url` with a non-empty override value.
    pub fn apply_env_override(&mut self, value: Option<String>) {
        if let Some(url) = value {
            let url = url.trim();
            if !url.is_empty() {
                self.api_url = url.to_string();
            }
        }
    }

    /// Directory holding the persisted session.
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .context("Could not determine a data directory; set data_dir in config.toml")
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "notekeeper", "notekeeper")
}
