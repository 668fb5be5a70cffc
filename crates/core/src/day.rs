use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar-day partition key in `YYYY-MM-DD` form.
///
/// Day keys are always derived from the UTC calendar day. Quota records,
/// sessions and streaks are partitioned by this key, so a uniform time
/// reference keeps every surface rolling over at the same instant.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(String);

impl DayKey {
    /// Wraps a raw stored key without validating its shape.
    ///
    /// Unparseable keys are tolerated on read; [`DayKey::to_date`] returns
    /// `None` for them and callers fall back to reinitializing state.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }

    /// The UTC calendar day containing `at`.
    #[must_use]
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self::from_date(at.date_naive())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the key back into a date, if it is well-formed.
    #[must_use]
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, "%Y-%m-%d").ok()
    }

    /// Signed number of days from `self` to `other`.
    ///
    /// Returns `None` when either key is unparseable.
    #[must_use]
    pub fn days_until(&self, other: &DayKey) -> Option<i64> {
        Some((other.to_date()? - self.to_date()?).num_days())
    }
}

impl fmt::Debug for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DayKey({})", self.0)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn derives_utc_calendar_day() {
        let key = DayKey::from_datetime(fixed_now());
        assert_eq!(key.as_str(), "2023-11-14");
    }

    #[test]
    fn days_until_spans_month_boundaries() {
        let a = DayKey::new("2024-01-31");
        let b = DayKey::new("2024-02-01");
        assert_eq!(a.days_until(&b), Some(1));
        assert_eq!(b.days_until(&a), Some(-1));
    }

    #[test]
    fn unparseable_key_yields_none() {
        let bad = DayKey::new("someday");
        let good = DayKey::new("2024-01-01");
        assert_eq!(bad.to_date(), None);
        assert_eq!(bad.days_until(&good), None);
        assert_eq!(good.days_until(&bad), None);
    }
}
