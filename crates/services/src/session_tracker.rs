use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;

use practice_core::Clock;
use practice_core::model::{OptionId, QuestionId, QuestionRecord, SessionState};
use storage::records::SessionRecord;
use storage::{KeySpace, KeyValueStore, read_json, write_json};

use crate::error::EngineError;

/// Outcome of answering the question under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub answered_count: u32,
    pub correct_count: u32,
}

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub is_complete: bool,
}

/// Holds today's shuffled question order and read cursor for one surface,
/// resumable across reloads within the same day.
pub struct SessionTracker {
    store: Arc<dyn KeyValueStore>,
    keys: KeySpace,
    clock: Clock,
    questions: Vec<QuestionRecord>,
    state: SessionState,
}

impl SessionTracker {
    /// Load today's persisted session or create a fresh one.
    ///
    /// A stored session is reused when its day key is today and its order is
    /// non-empty; rehydration clamps a drifted cursor. Anything else (stale
    /// day, corrupt record, empty order) starts a new session with a
    /// Fisher–Yates shuffle of the full question set. The one-time unlock
    /// flag carries over from a same-day predecessor even when the rest of
    /// the record is unusable.
    #[must_use]
    pub fn load_or_create(
        store: Arc<dyn KeyValueStore>,
        keys: KeySpace,
        clock: Clock,
        questions: Vec<QuestionRecord>,
    ) -> Self {
        let today = clock.today();
        let stored = read_json::<SessionRecord>(store.as_ref(), &keys.session());

        let carried_unlock = stored
            .as_ref()
            .filter(|record| record.date_key == today)
            .is_some_and(|record| record.account_unlock);

        let state = stored
            .and_then(|record| record.into_state().ok())
            .filter(|state| state.date_key() == &today && !state.order().is_empty())
            .unwrap_or_else(|| {
                let mut order: Vec<QuestionId> =
                    questions.iter().map(|q| q.id().clone()).collect();
                order.shuffle(&mut rand::rng());
                SessionState::start(today, order, carried_unlock)
            });

        let tracker = Self {
            store,
            keys,
            clock,
            questions,
            state,
        };
        tracker.persist();
        tracker
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The question under the cursor, or `None` when the session is
    /// complete.
    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        let id = self.state.current_question_id()?;
        self.questions.iter().find(|q| q.id() == id)
    }

    /// Grade the chosen option against the current question, advance the
    /// cursor and persist. At-most-once per call: every invocation advances
    /// state, never replays.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SessionComplete` when no question remains.
    pub fn record_answer(&mut self, chosen: &OptionId) -> Result<AnswerOutcome, EngineError> {
        let question = self
            .current_question()
            .ok_or(EngineError::SessionComplete)?;
        let is_correct = question.is_correct(chosen);

        self.state.apply_answer(is_correct)?;
        self.persist();

        Ok(AnswerOutcome {
            is_correct,
            answered_count: self.state.answered_count(),
            correct_count: self.state.correct_count(),
        })
    }

    /// Refresh the in-memory view from the persisted record.
    ///
    /// Never mutates the cursor itself; only [`Self::record_answer`] does.
    /// A missing, corrupt or stale record leaves the current state alone.
    pub fn advance(&mut self) {
        let today = self.clock.today();
        let refreshed = read_json::<SessionRecord>(self.store.as_ref(), &self.keys.session())
            .and_then(|record| record.into_state().ok())
            .filter(|state| state.date_key() == &today && !state.order().is_empty());

        if let Some(state) = refreshed {
            self.state = state;
        }
    }

    /// Ratchet the one-time unlock on and persist it.
    pub fn grant_account_unlock(&mut self) {
        self.state.grant_account_unlock();
        self.persist();
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.state.order().len(),
            answered: self.state.answered_count() as usize,
            correct: self.state.correct_count() as usize,
            is_complete: self.state.is_complete(),
        }
    }

    fn persist(&self) {
        let record = SessionRecord::from_state(&self.state);
        if write_json(self.store.as_ref(), &self.keys.session(), &record).is_err() {
            tracing::debug!(surface = %self.keys.surface(), "session write failed; keeping in-memory state");
        }
    }
}

impl fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTracker")
            .field("surface", self.keys.surface())
            .field("questions_len", &self.questions.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use practice_core::model::Surface;
    use practice_core::time::fixed_clock;
    use std::collections::BTreeMap;
    use storage::MemoryStore;

    fn build_question(id: u64) -> QuestionRecord {
        let options: BTreeMap<OptionId, String> = [
            (OptionId::new("a"), "alpha".to_owned()),
            (OptionId::new("b"), "beta".to_owned()),
        ]
        .into_iter()
        .collect();
        QuestionRecord::new(
            QuestionId::new(format!("q{id}")),
            format!("Question {id}?"),
            options,
            OptionId::new("a"),
            "because",
            "general",
        )
        .unwrap()
    }

    fn questions(n: u64) -> Vec<QuestionRecord> {
        (1..=n).map(build_question).collect()
    }

    fn keys() -> KeySpace {
        KeySpace::new(Surface::new("daily-practice"))
    }

    #[test]
    fn new_session_shuffles_the_full_set() {
        let store = MemoryStore::new();
        let tracker = SessionTracker::load_or_create(
            Arc::new(store),
            keys(),
            fixed_clock(),
            questions(6),
        );

        let mut ids: Vec<_> = tracker.state().order().iter().map(QuestionId::as_str).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["q1", "q2", "q3", "q4", "q5", "q6"]);
        assert_eq!(tracker.state().cursor(), 0);
    }

    #[test]
    fn same_day_session_is_resumed() {
        let store = MemoryStore::new();
        let mut tracker = SessionTracker::load_or_create(
            Arc::new(store.clone()),
            keys(),
            fixed_clock(),
            questions(3),
        );
        tracker.record_answer(&OptionId::new("a")).unwrap();
        let order: Vec<_> = tracker.state().order().to_vec();

        let resumed = SessionTracker::load_or_create(
            Arc::new(store),
            keys(),
            fixed_clock(),
            questions(3),
        );
        assert_eq!(resumed.state().order(), order.as_slice());
        assert_eq!(resumed.state().answered_count(), 1);
        assert_eq!(resumed.state().cursor(), 1);
    }

    #[test]
    fn next_day_reshuffles_but_resets_counts() {
        let store = MemoryStore::new();
        let mut clock = fixed_clock();
        let mut tracker = SessionTracker::load_or_create(
            Arc::new(store.clone()),
            keys(),
            clock,
            questions(3),
        );
        tracker.record_answer(&OptionId::new("b")).unwrap();

        clock.advance(chrono::Duration::days(1));
        let fresh =
            SessionTracker::load_or_create(Arc::new(store), keys(), clock, questions(3));
        assert_eq!(fresh.state().answered_count(), 0);
        assert_eq!(fresh.state().cursor(), 0);
        assert!(!fresh.state().account_unlock());
    }

    #[test]
    fn unlock_survives_a_same_day_corrupt_order() {
        let store = MemoryStore::new();
        // same-day record with an empty order but a granted unlock
        store
            .set(
                "pq:daily-practice:session",
                "{\"dateKey\":\"2023-11-14\",\"order\":[],\"answeredCount\":0,\
                 \"correctCount\":0,\"cursor\":0,\"accountUnlock\":true}",
            )
            .unwrap();

        let tracker = SessionTracker::load_or_create(
            Arc::new(store),
            keys(),
            fixed_clock(),
            questions(2),
        );
        assert!(tracker.state().account_unlock());
        assert_eq!(tracker.state().order().len(), 2);
    }

    #[test]
    fn grading_tracks_correct_and_incorrect() {
        let store = MemoryStore::new();
        let mut tracker = SessionTracker::load_or_create(
            Arc::new(store),
            keys(),
            fixed_clock(),
            questions(2),
        );

        let first = tracker.record_answer(&OptionId::new("a")).unwrap();
        assert!(first.is_correct);
        let second = tracker.record_answer(&OptionId::new("b")).unwrap();
        assert!(!second.is_correct);
        assert_eq!(second.answered_count, 2);
        assert_eq!(second.correct_count, 1);

        let err = tracker.record_answer(&OptionId::new("a")).unwrap_err();
        assert!(matches!(err, EngineError::SessionComplete));
    }

    #[test]
    fn advance_rereads_without_moving_the_cursor() {
        let store = MemoryStore::new();
        let mut tracker = SessionTracker::load_or_create(
            Arc::new(store.clone()),
            keys(),
            fixed_clock(),
            questions(3),
        );
        tracker.record_answer(&OptionId::new("a")).unwrap();
        let cursor = tracker.state().cursor();

        tracker.advance();
        assert_eq!(tracker.state().cursor(), cursor);

        // A corrupt persisted record leaves the in-memory state untouched.
        store.set("pq:daily-practice:session", "{bad").unwrap();
        tracker.advance();
        assert_eq!(tracker.state().cursor(), cursor);
    }
}
