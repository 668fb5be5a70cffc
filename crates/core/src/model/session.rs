use thiserror::Error;

use crate::day::DayKey;
use crate::model::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("correct count ({correct}) exceeds answered count ({answered})")]
    CountMismatch { correct: u32, answered: u32 },

    #[error("answered count ({answered}) exceeds question order length ({len})")]
    AnsweredOutOfRange { answered: u32, len: usize },

    #[error("session is already complete")]
    Complete,
}

/// Resumable cursor state for one surface's quiz session.
///
/// `order` is a permutation of the question set generated once per day key.
/// The ordering invariant `correct_count <= answered_count <= cursor <=
/// order.len()` holds at all times; only [`SessionState::apply_answer`]
/// advances the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    date_key: DayKey,
    order: Vec<QuestionId>,
    answered_count: u32,
    correct_count: u32,
    cursor: usize,
    account_unlock: bool,
}

impl SessionState {
    /// Start a fresh session for `date_key` over an already-shuffled order.
    ///
    /// `account_unlock` carries over from a same-day predecessor session so
    /// a reload never revokes a granted unlock.
    #[must_use]
    pub fn start(date_key: DayKey, order: Vec<QuestionId>, account_unlock: bool) -> Self {
        Self {
            date_key,
            order,
            answered_count: 0,
            correct_count: 0,
            cursor: 0,
            account_unlock,
        }
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// The cursor is clamped defensively into `[answered_count, order.len()]`
    /// rather than rejected, since a drifted cursor is recoverable.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` when the counts themselves are
    /// inconsistent; callers treat that as corrupt state and reinitialize.
    pub fn from_persisted(
        date_key: DayKey,
        order: Vec<QuestionId>,
        answered_count: u32,
        correct_count: u32,
        cursor: usize,
        account_unlock: bool,
    ) -> Result<Self, SessionStateError> {
        if correct_count > answered_count {
            return Err(SessionStateError::CountMismatch {
                correct: correct_count,
                answered: answered_count,
            });
        }
        if answered_count as usize > order.len() {
            return Err(SessionStateError::AnsweredOutOfRange {
                answered: answered_count,
                len: order.len(),
            });
        }

        let cursor = cursor.clamp(answered_count as usize, order.len());

        Ok(Self {
            date_key,
            order,
            answered_count,
            correct_count,
            cursor,
            account_unlock,
        })
    }

    #[must_use]
    pub fn date_key(&self) -> &DayKey {
        &self.date_key
    }

    #[must_use]
    pub fn order(&self) -> &[QuestionId] {
        &self.order
    }

    #[must_use]
    pub fn answered_count(&self) -> u32 {
        self.answered_count
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn account_unlock(&self) -> bool {
        self.account_unlock
    }

    /// The question id under the cursor, or `None` when the session is
    /// complete (distinct from quota exhaustion, which gates answering).
    #[must_use]
    pub fn current_question_id(&self) -> Option<&QuestionId> {
        self.order.get(self.cursor)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.order.len()
    }

    /// Number of questions left in the shuffled order.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.order.len().saturating_sub(self.cursor)
    }

    /// Record the outcome of answering the question under the cursor.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Complete` when every question has
    /// already been answered.
    pub fn apply_answer(&mut self, is_correct: bool) -> Result<(), SessionStateError> {
        if self.is_complete() {
            return Err(SessionStateError::Complete);
        }

        self.answered_count = self.answered_count.saturating_add(1);
        if is_correct {
            self.correct_count = self.correct_count.saturating_add(1);
        }
        self.cursor += 1;
        Ok(())
    }

    /// One-way ratchet: grants the one-time unlock for the rest of the day.
    ///
    /// Nothing resets this to `false`; only a new day's session starts
    /// without it.
    pub fn grant_account_unlock(&mut self) {
        self.account_unlock = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(n: usize) -> Vec<QuestionId> {
        (0..n).map(|i| QuestionId::new(format!("q{i}"))).collect()
    }

    #[test]
    fn ordering_invariant_holds_through_answers() {
        let mut state = SessionState::start(DayKey::new("2024-01-01"), order(3), false);

        state.apply_answer(true).unwrap();
        state.apply_answer(false).unwrap();

        assert!(state.correct_count() <= state.answered_count());
        assert!(state.answered_count() as usize <= state.cursor());
        assert!(state.cursor() <= state.order().len());
        assert_eq!(state.answered_count(), 2);
        assert_eq!(state.correct_count(), 1);
        assert_eq!(state.cursor(), 2);
    }

    #[test]
    fn completed_session_rejects_answers() {
        let mut state = SessionState::start(DayKey::new("2024-01-01"), order(1), false);
        state.apply_answer(true).unwrap();

        assert!(state.is_complete());
        assert_eq!(state.current_question_id(), None);
        assert_eq!(state.apply_answer(true), Err(SessionStateError::Complete));
        assert_eq!(state.answered_count(), 1);
    }

    #[test]
    fn persisted_cursor_is_clamped() {
        let state = SessionState::from_persisted(
            DayKey::new("2024-01-01"),
            order(3),
            2,
            1,
            9, // drifted past the order length
            false,
        )
        .unwrap();
        assert_eq!(state.cursor(), 3);

        let state = SessionState::from_persisted(
            DayKey::new("2024-01-01"),
            order(3),
            2,
            1,
            0, // drifted below answered
            false,
        )
        .unwrap();
        assert_eq!(state.cursor(), 2);
    }

    #[test]
    fn inconsistent_counts_are_rejected() {
        let err = SessionState::from_persisted(
            DayKey::new("2024-01-01"),
            order(3),
            1,
            2,
            1,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, SessionStateError::CountMismatch { .. }));

        let err = SessionState::from_persisted(
            DayKey::new("2024-01-01"),
            order(2),
            5,
            1,
            5,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, SessionStateError::AnsweredOutOfRange { .. }));
    }

    #[test]
    fn unlock_is_a_one_way_ratchet() {
        let mut state = SessionState::start(DayKey::new("2024-01-01"), order(2), false);
        assert!(!state.account_unlock());
        state.grant_account_unlock();
        state.grant_account_unlock();
        assert!(state.account_unlock());
    }
}
