use std::sync::Arc;

use practice_core::Clock;
use practice_core::model::StreakState;
use storage::records::StreakRecord;
use storage::{KeySpace, KeyValueStore, read_json, write_json};

use crate::events::{EngineEvent, EventBus};

/// Persists the consecutive-day streak for one surface.
pub struct StreakService {
    store: Arc<dyn KeyValueStore>,
    keys: KeySpace,
    clock: Clock,
    bus: EventBus,
}

impl StreakService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, keys: KeySpace, clock: Clock, bus: EventBus) -> Self {
        Self {
            store,
            keys,
            clock,
            bus,
        }
    }

    /// The streak as currently persisted; corrupt or missing reads as a
    /// fresh zero streak.
    #[must_use]
    pub fn current(&self) -> StreakState {
        read_json::<StreakRecord>(self.store.as_ref(), &self.keys.streak())
            .map(StreakRecord::into_state)
            .unwrap_or_default()
    }

    /// Record a qualifying activity for today and return the updated streak.
    ///
    /// Same-day repeats are idempotent and skip both the write and the
    /// event.
    pub fn record_activity(&self) -> StreakState {
        let today = self.clock.today();
        let mut streak = self.current();

        if streak.record_activity(&today) {
            let record = StreakRecord::from_state(&streak);
            if write_json(self.store.as_ref(), &self.keys.streak(), &record).is_err() {
                tracing::debug!(surface = %self.keys.surface(), "streak write failed; keeping in-memory state");
            }
            self.bus.emit(&EngineEvent::StreakUpdated {
                streak: streak.clone(),
            });
        }

        streak
    }
}
