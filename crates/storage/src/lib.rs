#![forbid(unsafe_code)]

pub mod codec;
pub mod keys;
pub mod kv;
pub mod records;
pub mod snapshot;

pub use codec::{read_json, write_json};
pub use keys::KeySpace;
pub use kv::{KeyValueStore, MemoryStore, StorageError};
pub use records::{QuotaStoredRecord, SessionRecord, StreakRecord};
pub use snapshot::{Bundle, export_snapshot, import_snapshot};
