//! Recently used filter keys.
//!
//! The list is most-recent-first, de-duplicated by key and capped (10 by
//! default). Persistence is optional: [`MemoryRecentKeyStore`] keeps the
//! list for the process lifetime, [`JsonFileRecentKeyStore`] writes it to a
//! JSON file named after [`RECENT_KEYS_STORAGE_KEY`].

mod atomic;

use std::path::PathBuf;
use std::sync::Mutex;

use crate::suggest::FilterKeyDescriptor;
use crate::Result;

/// Fixed storage key for the persisted list.
pub const RECENT_KEYS_STORAGE_KEY: &str = "querybar-recent-keys";

/// Default cap on remembered keys.
pub const MAX_RECENT_KEYS: usize = 10;

/// Backing store for the recent-keys list.
pub trait RecentKeyStore: Send + Sync {
    fn load(&self) -> Result<Vec<FilterKeyDescriptor>>;
    fn save(&self, keys: &[FilterKeyDescriptor]) -> Result<()>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryRecentKeyStore {
    keys: Mutex<Vec<FilterKeyDescriptor>>,
}

impl MemoryRecentKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecentKeyStore for MemoryRecentKeyStore {
    fn load(&self) -> Result<Vec<FilterKeyDescriptor>> {
        Ok(self.keys.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, keys: &[FilterKeyDescriptor]) -> Result<()> {
        *self.keys.lock().unwrap_or_else(|e| e.into_inner()) = keys.to_vec();
        Ok(())
    }
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct JsonFileRecentKeyStore {
    path: PathBuf,
}

impl JsonFileRecentKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the location given by the config.
    pub fn from_config(config: &crate::Config) -> Self {
        Self::new(config.recent_keys_path())
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl RecentKeyStore for JsonFileRecentKeyStore {
    fn load(&self) -> Result<Vec<FilterKeyDescriptor>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, keys: &[FilterKeyDescriptor]) -> Result<()> {
        let contents = serde_json::to_vec_pretty(keys)?;
        atomic::write_file(&self.path, &contents)?;
        Ok(())
    }
}

/// Most-recently-used filter keys.
pub struct RecentKeys {
    store: Box<dyn RecentKeyStore>,
    limit: usize,
    keys: Vec<FilterKeyDescriptor>,
}

impl std::fmt::Debug for RecentKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentKeys")
            .field("limit", &self.limit)
            .field("keys", &self.keys)
            .finish()
    }
}

impl Default for RecentKeys {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl RecentKeys {
    /// Load the list from `store`. A store that cannot be read starts empty.
    pub fn open(store: Box<dyn RecentKeyStore>, limit: usize) -> Self {
        let mut keys = store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load recent filter keys");
            Vec::new()
        });
        keys.truncate(limit);
        Self { store, limit, keys }
    }

    /// Non-persistent list with the default cap.
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryRecentKeyStore::new()), MAX_RECENT_KEYS)
    }

    /// Current list, most recent first.
    pub fn keys(&self) -> &[FilterKeyDescriptor] {
        &self.keys
    }

    /// Move `descriptor` to the front and persist. Save failures are logged;
    /// the in-memory list is still updated.
    pub fn record(&mut self, descriptor: FilterKeyDescriptor) {
        self.keys.retain(|k| k.key != descriptor.key);
        self.keys.insert(0, descriptor);
        self.keys.truncate(self.limit);

        if let Err(e) = self.store.save(&self.keys) {
            tracing::warn!(error = %e, "Failed to save recent filter keys");
        }
    }
}
