use serde_json::{Map, Value};

use crate::keys::KeySpace;
use crate::kv::{KeyValueStore, StorageError};

/// A full snapshot of one surface's persisted records, keyed by storage key.
pub type Bundle = Map<String, Value>;

/// Collect every record under the surface's namespace into one bundle.
///
/// Values that are not valid JSON are carried as strings so an export never
/// loses data it cannot parse.
///
/// # Errors
///
/// Returns `StorageError` when the store cannot be enumerated or read.
pub fn export_snapshot(
    store: &dyn KeyValueStore,
    space: &KeySpace,
) -> Result<Bundle, StorageError> {
    let mut bundle = Bundle::new();
    for key in store.keys_with_prefix(&space.prefix())? {
        let Some(raw) = store.get(&key)? else {
            continue;
        };
        let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
        bundle.insert(key, value);
    }
    Ok(bundle)
}

/// Merge an externally supplied snapshot into the store, key by key.
///
/// Composite records merge field-by-field with incoming values winning per
/// present field; unknown fields on either side are preserved. When either
/// side is a scalar the incoming value replaces the local one wholesale.
/// Unexpected shapes never panic.
///
/// # Errors
///
/// Returns `StorageError` when the store cannot be read or written.
pub fn import_snapshot(store: &dyn KeyValueStore, bundle: &Bundle) -> Result<(), StorageError> {
    for (key, incoming) in bundle {
        let local = store
            .get(key)?
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok());

        let merged = match local {
            Some(local) => merge_value(local, incoming),
            None => incoming.clone(),
        };

        let raw = serde_json::to_string(&merged)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        store.set(key, &raw)?;
    }
    Ok(())
}

/// Structural merge: objects combine recursively with the incoming side
/// winning per field, anything else is replaced by the incoming value.
fn merge_value(local: Value, incoming: &Value) -> Value {
    match (local, incoming) {
        (Value::Object(mut local), Value::Object(incoming)) => {
            for (field, value) in incoming {
                let merged = match local.remove(field) {
                    Some(prior) => merge_value(prior, value),
                    None => value.clone(),
                };
                local.insert(field.clone(), merged);
            }
            Value::Object(local)
        }
        (_, incoming) => incoming.clone(),
    }
}
