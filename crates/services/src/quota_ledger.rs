use std::sync::Arc;

use practice_core::Clock;
use practice_core::DayKey;
use practice_core::model::QuotaRecord;
use storage::records::QuotaStoredRecord;
use storage::{KeySpace, KeyValueStore, read_json, write_json};

/// Tracks how many questions a visitor has consumed today on one surface.
///
/// Every read rolls stale records over to today; every failure path
/// degrades to an in-memory count of zero rather than erroring. Writes are
/// best-effort: a full or unavailable store costs persistence, not
/// correctness of the current call.
pub struct QuotaLedger {
    store: Arc<dyn KeyValueStore>,
    keys: KeySpace,
    clock: Clock,
}

impl QuotaLedger {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, keys: KeySpace, clock: Clock) -> Self {
        Self { store, keys, clock }
    }

    /// Questions consumed today. Never fails; storage trouble reads as 0.
    #[must_use]
    pub fn get_used(&self) -> u32 {
        self.load_today().used()
    }

    /// Consume one question and return the new count for today.
    pub fn record_use(&self) -> u32 {
        let mut record = self.load_today();
        let used = record.record_use();
        self.persist(&record);
        used
    }

    fn load_today(&self) -> QuotaRecord {
        let today = self.clock.today();

        if let Some(stored) = read_json::<QuotaStoredRecord>(self.store.as_ref(), &self.keys.quota())
        {
            return stored.into_record().normalized(&today);
        }

        // No canonical record: consult legacy per-day keys before concluding
        // usage is zero, so a schema change never resets today's count.
        if let Some(used) = self.migrate_legacy(&today) {
            let record = QuotaRecord::from_persisted(today, used);
            self.persist(&record);
            return record;
        }

        QuotaRecord::new(today)
    }

    /// Read today's count from a legacy key, removing the key once drained.
    fn migrate_legacy(&self, today: &DayKey) -> Option<u32> {
        for key in self.keys.legacy_quota_keys(today) {
            let Ok(Some(raw)) = self.store.get(&key) else {
                continue;
            };
            if let Some(used) = parse_legacy_count(&raw) {
                let _ = self.store.remove(&key);
                return Some(used);
            }
        }
        None
    }

    fn persist(&self, record: &QuotaRecord) {
        let stored = QuotaStoredRecord::from_record(record);
        if write_json(self.store.as_ref(), &self.keys.quota(), &stored).is_err() {
            tracing::debug!(surface = %self.keys.surface(), "quota write failed; keeping in-memory count");
        }
    }
}

/// Legacy values were either a bare integer or a `{"used": n}` object.
fn parse_legacy_count(raw: &str) -> Option<u32> {
    if let Ok(n) = raw.trim().parse::<u32>() {
        return Some(n);
    }
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    u32::try_from(value.get("used")?.as_u64()?).ok()
}
