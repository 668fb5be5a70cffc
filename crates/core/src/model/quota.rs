use crate::day::DayKey;

/// Day-keyed counter of questions consumed on one surface.
///
/// `used` only ever increases within a day key; a record carrying a stale
/// day key is replaced with a fresh zeroed record on the next read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaRecord {
    date_key: DayKey,
    used: u32,
}

impl QuotaRecord {
    /// A fresh, unused record for the given day.
    #[must_use]
    pub fn new(date_key: DayKey) -> Self {
        Self { date_key, used: 0 }
    }

    /// Rehydrate a record from persisted storage.
    #[must_use]
    pub fn from_persisted(date_key: DayKey, used: u32) -> Self {
        Self { date_key, used }
    }

    #[must_use]
    pub fn date_key(&self) -> &DayKey {
        &self.date_key
    }

    #[must_use]
    pub fn used(&self) -> u32 {
        self.used
    }

    /// Whether this record belongs to the given day.
    #[must_use]
    pub fn is_for(&self, day: &DayKey) -> bool {
        &self.date_key == day
    }

    /// Replace a stale record with a fresh one for `today`; same-day records
    /// pass through unchanged.
    #[must_use]
    pub fn normalized(self, today: &DayKey) -> Self {
        if self.is_for(today) {
            self
        } else {
            Self::new(today.clone())
        }
    }

    /// Consume one question and return the new count.
    pub fn record_use(&mut self) -> u32 {
        self.used = self.used.saturating_add(1);
        self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_record_resets_on_normalize() {
        let record = QuotaRecord::from_persisted(DayKey::new("2024-01-01"), 4);
        let today = DayKey::new("2024-01-02");
        let normalized = record.normalized(&today);
        assert_eq!(normalized.used(), 0);
        assert!(normalized.is_for(&today));
    }

    #[test]
    fn same_day_record_keeps_count() {
        let today = DayKey::new("2024-01-02");
        let mut record = QuotaRecord::from_persisted(today.clone(), 4).normalized(&today);
        assert_eq!(record.used(), 4);
        assert_eq!(record.record_use(), 5);
    }
}
