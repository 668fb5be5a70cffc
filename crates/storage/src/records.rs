use serde::{Deserialize, Serialize};

use practice_core::DayKey;
use practice_core::model::{QuestionId, QuotaRecord, SessionState, SessionStateError, StreakState};

/// Persisted shape for a session, mirroring the original camelCase JSON
/// layout for on-disk compatibility.
///
/// Mirrors the domain `SessionState` so the store can serialize and
/// deserialize without leaking storage concerns into the domain layer;
/// rehydration goes through `SessionState::from_persisted`, which validates
/// counts and clamps a drifted cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub date_key: DayKey,
    pub order: Vec<QuestionId>,
    pub answered_count: u32,
    pub correct_count: u32,
    pub cursor: usize,
    #[serde(default)]
    pub account_unlock: bool,
}

impl SessionRecord {
    #[must_use]
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            date_key: state.date_key().clone(),
            order: state.order().to_vec(),
            answered_count: state.answered_count(),
            correct_count: state.correct_count(),
            cursor: state.cursor(),
            account_unlock: state.account_unlock(),
        }
    }

    /// Convert the record back into a validated domain `SessionState`.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` if the persisted counts are
    /// inconsistent; callers treat that as corrupt state and start fresh.
    pub fn into_state(self) -> Result<SessionState, SessionStateError> {
        SessionState::from_persisted(
            self.date_key,
            self.order,
            self.answered_count,
            self.correct_count,
            self.cursor,
            self.account_unlock,
        )
    }
}

/// Persisted shape for a quota record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStoredRecord {
    pub date_key: DayKey,
    pub used: u32,
}

impl QuotaStoredRecord {
    #[must_use]
    pub fn from_record(record: &QuotaRecord) -> Self {
        Self {
            date_key: record.date_key().clone(),
            used: record.used(),
        }
    }

    #[must_use]
    pub fn into_record(self) -> QuotaRecord {
        QuotaRecord::from_persisted(self.date_key, self.used)
    }
}

/// Persisted shape for the day streak.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    pub current: u32,
    #[serde(default)]
    pub last_active_date_key: Option<DayKey>,
}

impl StreakRecord {
    #[must_use]
    pub fn from_state(state: &StreakState) -> Self {
        Self {
            current: state.current(),
            last_active_date_key: state.last_active().cloned(),
        }
    }

    #[must_use]
    pub fn into_state(self) -> StreakState {
        StreakState::from_persisted(self.current, self.last_active_date_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_record_preserves_camel_case_layout() {
        let state = SessionState::start(
            DayKey::new("2024-01-01"),
            vec![QuestionId::new("q1"), QuestionId::new("q2")],
            true,
        );
        let json = serde_json::to_string(&SessionRecord::from_state(&state)).unwrap();
        assert!(json.contains("\"dateKey\""));
        assert!(json.contains("\"answeredCount\""));
        assert!(json.contains("\"accountUnlock\""));
    }

    #[test]
    fn corrupt_session_record_fails_rehydration() {
        let record = SessionRecord {
            date_key: DayKey::new("2024-01-01"),
            order: vec![QuestionId::new("q1")],
            answered_count: 0,
            correct_count: 3,
            cursor: 0,
            account_unlock: false,
        };
        assert!(record.into_state().is_err());
    }

    #[test]
    fn streak_record_tolerates_missing_last_active() {
        let record: StreakRecord = serde_json::from_str("{\"current\":4}").unwrap();
        let state = record.into_state();
        assert_eq!(state.current(), 4);
        assert_eq!(state.last_active(), None);
    }
}
