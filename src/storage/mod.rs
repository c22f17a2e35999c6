//! Local persistent storage
//!
//! A small key-value file that plays the role browser local storage plays for
//! the web front-end: it holds the bearer token and the chat assistant
//! preference, nothing else. Stored in `<data dir>/local_storage.json` with
//! 0600 permissions (owner read/write only).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::pm_sync::PmPreference;

/// Bearer token returned by `/auth/login` and `/auth/register`
pub const TOKEN_KEY: &str = "fulcrum_token";
/// Preferred chat assistant account id
pub const PM_ACCOUNT_KEY: &str = "pm_account_id";
/// Preferred chat assistant model
pub const PM_MODEL_KEY: &str = "pm_model";

/// On-disk format with version for future migrations
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoredValues {
    version: u32,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// File-backed key-value store
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl LocalStore {
    /// Current storage schema version
    const VERSION: u32 = 1;

    /// Open the store in the default data directory
    pub fn open_default() -> Result<Self> {
        let dir = crate::config::Config::data_dir()?;
        Self::open(dir.join("local_storage.json"))
    }

    /// Open (or lazily create) a store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content =
                std::fs::read_to_string(&path).context("Failed to read local storage file")?;
            let stored: StoredValues =
                serde_json::from_str(&content).context("Failed to parse local storage file")?;
            if stored.version > Self::VERSION {
                anyhow::bail!(
                    "Local storage version {} is newer than supported version {}",
                    stored.version,
                    Self::VERSION
                );
            }
            stored.values
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.values.insert(key.to_string(), value.into());
        self.flush()
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn set_token(&mut self, token: &str) -> Result<()> {
        self.set(TOKEN_KEY, token)
    }

    pub fn clear_token(&mut self) -> Result<()> {
        self.remove(TOKEN_KEY)
    }

    /// Saved chat assistant selection (either half may be missing)
    pub fn pm_preference(&self) -> PmPreference {
        PmPreference {
            account_id: self.get(PM_ACCOUNT_KEY).map(str::to_string),
            model: self.get(PM_MODEL_KEY).map(str::to_string),
        }
    }

    /// Persist the chat assistant selection; `None` halves are removed
    pub fn set_pm_preference(&mut self, pref: &PmPreference) -> Result<()> {
        match &pref.account_id {
            Some(id) => self.values.insert(PM_ACCOUNT_KEY.to_string(), id.clone()),
            None => self.values.remove(PM_ACCOUNT_KEY),
        };
        match &pref.model {
            Some(model) => self.values.insert(PM_MODEL_KEY.to_string(), model.clone()),
            None => self.values.remove(PM_MODEL_KEY),
        };
        self.flush()
    }

    /// Write to a temp file first, then rename (atomic)
    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }

        let stored = StoredValues {
            version: Self::VERSION,
            values: self.values.clone(),
        };
        let content = serde_json::to_string_pretty(&stored)?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content).context("Failed to write temp storage file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&temp_path, perms)
                .context("Failed to set storage file permissions")?;
        }

        std::fs::rename(&temp_path, &self.path).context("Failed to save storage file")?;
        tracing::debug!("Saved local storage to {:?}", self.path);
        Ok(())
    }
}
