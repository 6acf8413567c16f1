//! Local favorites storage.
//!
//! A capacity-aware membership set of tip ids kept on the visitor's device,
//! used when no authenticated identity exists. The storage medium is an
//! injected [`KeyValueStore`] capability so tests can substitute an in-memory
//! fake; production uses [`FileStore`] under the configured data directory.
//!
//! Favorites are a convenience feature, not critical state: every operation
//! swallows storage failures and degrades to a no-op rather than surfacing an
//! error to the caller.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Storage key for the serialized favorite id list.
pub const FAVORITES_STORAGE_KEY: &str = "lifehacks.favorites";

/// Maximum number of anonymous favorites materialized for display.
///
/// Storage itself is unbounded; only the first N insertions are resolved into
/// tip records for anonymous visitors.
pub const ANONYMOUS_MAX_FAVORITES: usize = 5;

/// Errors from the underlying storage medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Medium unavailable (quota exceeded, disabled, private-browsing limits)
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "storage unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable key-value storage capability.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and ephemeral sessions.
///
/// Can be flipped unavailable to exercise the silent-degradation contract.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    unavailable: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the medium becoming unavailable (quota, private browsing).
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if *self.unavailable.lock().unwrap() {
            Err(StoreError::Unavailable("memory store disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys may contain dots; they are fixed constants, not user input.
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        std::fs::write(self.path_for(key), value)
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }
}

/// The local favorites set: an ordered, duplicate-free id list with a
/// capacity-aware read for anonymous display.
pub struct LocalFavorites<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> LocalFavorites<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Insert an id if absent, appending at the end. Idempotent.
    pub fn add(&self, id: &str) {
        let mut ids = self.list();
        if ids.iter().any(|existing| existing == id) {
            return;
        }
        ids.push(id.to_string());
        self.write(&ids);
    }

    /// Delete an id if present; no-op otherwise.
    pub fn remove(&self, id: &str) {
        let mut ids = self.list();
        let before = ids.len();
        ids.retain(|existing| existing != id);
        if ids.len() != before {
            self.write(&ids);
        }
    }

    pub fn has(&self, id: &str) -> bool {
        self.list().iter().any(|existing| existing == id)
    }

    /// All stored ids in insertion order, unbounded.
    pub fn list(&self) -> Vec<String> {
        let raw = match self.store.get(FAVORITES_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::debug!("Favorites storage read failed, treating as empty: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("Corrupt favorites list in storage, resetting: {}", e);
                Vec::new()
            }
        }
    }

    /// The first [`ANONYMOUS_MAX_FAVORITES`] insertions, for display.
    ///
    /// Earliest insertions always win the cap: exceeding it hides later
    /// favorites from view, it never evicts them from storage.
    pub fn effective_list(&self) -> Vec<String> {
        let mut ids = self.list();
        ids.truncate(ANONYMOUS_MAX_FAVORITES);
        ids
    }

    fn write(&self, ids: &[String]) {
        let raw = match serde_json::to_string(ids) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to encode favorites list: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(FAVORITES_STORAGE_KEY, &raw) {
            tracing::debug!("Favorites storage write failed, dropping update: {}", e);
        }
    }
}
