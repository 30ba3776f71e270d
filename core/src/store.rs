//! Preferences storage keyed by host
//!
//! Stores never fail a read: a host with no entry gets the default
//! preferences. Writes to the file-backed store go through confy so the
//! document lives in the platform configuration directory by default.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use delight_types::{DEFAULT_PREFERENCES, Preferences};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

const APP_NAME: &str = "delight";
const CONFIG_NAME: &str = "preferences";

/// Persistence for per-host preferences
pub trait PreferencesStore: Send + 'static {
    /// Preferences for `host`, or the defaults when nothing is stored
    fn get(&self, host: &str) -> Preferences;

    /// Replace the preferences for `host`
    fn set(&mut self, host: &str, preferences: Preferences) -> Result<(), StoreError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────────────────────────────────────

/// Volatile store, used by tests and embedders that persist elsewhere
#[derive(Debug, Clone)]
pub struct MemoryStore {
    hosts: HashMap<String, Preferences>,
    defaults: Preferences,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_defaults(DEFAULT_PREFERENCES)
    }

    pub fn with_defaults(defaults: Preferences) -> Self {
        Self {
            hosts: HashMap::new(),
            defaults,
        }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferencesStore for MemoryStore {
    fn get(&self, host: &str) -> Preferences {
        self.hosts.get(host).copied().unwrap_or(self.defaults)
    }

    fn set(&mut self, host: &str, preferences: Preferences) -> Result<(), StoreError> {
        self.hosts.insert(host.to_string(), preferences);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File store
// ─────────────────────────────────────────────────────────────────────────────

/// On-disk document: one preferences table per host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredPreferences {
    #[serde(default)]
    pub hosts: HashMap<String, Preferences>,
}

/// Store persisted as a TOML document
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: StoredPreferences,
}

impl FileStore {
    /// Open the store in the platform configuration directory
    pub fn open_default() -> Result<Self, StoreError> {
        let path = confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
            .map_err(StoreError::ConfigPath)?;
        Self::open(path)
    }

    /// Open (or create) the store at an explicit path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data: StoredPreferences =
            confy::load_path(&path).map_err(|source| StoreError::Load {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = ?path, hosts = data.hosts.len(), "Loaded preferences");
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hosts with stored preferences, sorted
    pub fn hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = self.data.hosts.keys().map(String::as_str).collect();
        hosts.sort_unstable();
        hosts
    }

    fn save(&self) -> Result<(), StoreError> {
        confy::store_path(&self.path, &self.data).map_err(|source| StoreError::Save {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferencesStore for FileStore {
    fn get(&self, host: &str) -> Preferences {
        self.data
            .hosts
            .get(host)
            .copied()
            .unwrap_or(DEFAULT_PREFERENCES)
    }

    fn set(&mut self, host: &str, preferences: Preferences) -> Result<(), StoreError> {
        let previous = self.data.hosts.insert(host.to_string(), preferences);
        if let Err(e) = self.save() {
            // Keep memory consistent with disk
            match previous {
                Some(p) => self.data.hosts.insert(host.to_string(), p),
                None => self.data.hosts.remove(host),
            };
            return Err(e);
        }
        Ok(())
    }
}
