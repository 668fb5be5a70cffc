use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Errors surfaced by key-value store adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A synchronous, string-keyed, per-origin store with small capacity.
///
/// Models the browser-style persisted store the engine runs against: no
/// transactions, one writer at a time per tab, and key enumeration in the
/// style of `localStorage.key(i)`. Read-modify-write sequences are not
/// atomic; two concurrent tabs can race, which is an accepted limitation.
/// A versioned compare-and-swap implementation can be slotted in behind
/// this trait if that ever needs solving.
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` when the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write the raw value under `key`, overwriting any prior value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` when the store cannot be
    /// written, including capacity exhaustion.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` when the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Enumerate every key starting with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` when the store cannot be read.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// Simple in-memory store implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let mut keys: Vec<String> = guard
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}
