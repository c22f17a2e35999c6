//! Configuration management for fulcrum
//!
//! Settings live in `config.toml` under the platform config directory
//! (`~/.config/fulcrum/config.toml` on Linux). Every section has defaults, so a
//! missing file or a partial file is fine.
//!
//! Environment overrides:
//! - `FULCRUM_CONFIG`: explicit path to the config file
//! - `FULCRUM_URL`: server base URL
//! - `FULCRUM_DATA_DIR`: directory for local storage, cache stores and logs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub offline: OfflineConfig,
    pub browser: BrowserConfig,
    pub tui: TuiConfig,
}

/// Fulcrum backend connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Offline cache proxy (`fulcrum serve`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OfflineConfig {
    /// Cache store name. Bump on every release so stale stores get evicted.
    pub cache_version: String,
    pub host: String,
    pub port: u16,
    /// Where cache stores live (default: `<data dir>/cache`)
    pub cache_dir: Option<PathBuf>,
    /// Static assets fetched into the cache at install time
    pub assets: Vec<String>,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            cache_version: "fulcrum-v0.1.1".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8787,
            cache_dir: None,
            assets: vec![
                "/".to_string(),
                "/static/css/style.css".to_string(),
                "/static/js/app.js".to_string(),
                "/static/icons/favicon.png".to_string(),
                "/static/manifest.json".to_string(),
            ],
        }
    }
}

/// Remote workspace path browser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowserConfig {
    /// What `~` expands to inside a workspace
    pub home_dir: String,
    /// Locations probed in order when a project has no saved path
    pub preferred_paths: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            home_dir: "/home/coder".to_string(),
            preferred_paths: vec![
                "~".to_string(),
                "/workspace".to_string(),
                "/workspaces".to_string(),
                "/".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TuiConfig {
    /// Input poll interval of the dashboard loop
    pub tick_rate_ms: u64,
    /// `catppuccin-mocha` or `nord`
    pub theme: String,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 50,
            theme: "catppuccin-mocha".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from default location or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a specific config file (no environment overrides)
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("FULCRUM_URL") {
            if !url.trim().is_empty() {
                self.server.base_url = url.trim().to_string();
            }
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("FULCRUM_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "fulcrum") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Ok(PathBuf::from("config.toml"))
        }
    }

    /// Directory for local storage, cache stores and the dashboard log
    pub fn data_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("FULCRUM_DATA_DIR") {
            return Ok(PathBuf::from(dir));
        }
        let data_dir = dirs::data_local_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .context("Failed to determine data directory")?;
        Ok(data_dir.join("fulcrum"))
    }

    /// Where the offline proxy keeps its cache stores
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.offline.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::data_dir()?.join("cache")),
        }
    }

    /// Save configuration to default location
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Ok(config_path)
    }
}
