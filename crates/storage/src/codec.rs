use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::kv::{KeyValueStore, StorageError};

/// Read a JSON record, treating every failure as absence.
///
/// Missing keys, unreadable stores and corrupt values all yield `None`,
/// per the engine's degradation policy: corrupt state is reinitialized,
/// never propagated.
#[must_use]
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key).ok().flatten()?;
    serde_json::from_str(&raw).ok()
}

/// Serialize a record to UTF-8 JSON under `key`.
///
/// # Errors
///
/// Returns `StorageError` when serialization or the underlying write
/// fails; callers on the degradation path ignore the error and keep their
/// in-memory state.
pub fn write_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Probe {
        n: u32,
    }

    #[test]
    fn round_trips_json_records() {
        let store = MemoryStore::new();
        write_json(&store, "probe", &Probe { n: 7 }).unwrap();
        assert_eq!(read_json::<Probe>(&store, "probe"), Some(Probe { n: 7 }));
    }

    #[test]
    fn corrupt_value_reads_as_absent() {
        let store = MemoryStore::new();
        store.set("probe", "{not json").unwrap();
        assert_eq!(read_json::<Probe>(&store, "probe"), None);
    }

    #[test]
    fn missing_key_reads_as_absent() {
        let store = MemoryStore::new();
        assert_eq!(read_json::<Probe>(&store, "probe"), None);
    }
}
