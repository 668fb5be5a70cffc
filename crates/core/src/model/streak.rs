use crate::day::DayKey;

/// Consecutive-day activity streak derived from the last active day.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreakState {
    current: u32,
    last_active: Option<DayKey>,
}

impl StreakState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a streak from persisted storage.
    #[must_use]
    pub fn from_persisted(current: u32, last_active: Option<DayKey>) -> Self {
        Self {
            current,
            last_active,
        }
    }

    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub fn last_active(&self) -> Option<&DayKey> {
        self.last_active.as_ref()
    }

    /// Record a qualifying activity on `day` and return whether anything
    /// changed.
    ///
    /// Rules:
    /// - first activity ever starts the streak at 1;
    /// - repeated activity on the same day is idempotent;
    /// - the next consecutive day increments the streak;
    /// - a gap of more than one day restarts it at 1;
    /// - a backdated day (clock skew) is ignored entirely.
    ///
    /// An unparseable stored day key restarts the streak at 1, the same as
    /// a gap.
    pub fn record_activity(&mut self, day: &DayKey) -> bool {
        let Some(last) = &self.last_active else {
            self.current = 1;
            self.last_active = Some(day.clone());
            return true;
        };

        if last == day {
            return false;
        }

        match last.days_until(day) {
            Some(1) => self.current = self.current.saturating_add(1),
            Some(diff) if diff < 0 => return false,
            _ => self.current = 1,
        }

        self.last_active = Some(day.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_activity_starts_at_one() {
        let mut streak = StreakState::new();
        assert!(streak.record_activity(&DayKey::new("2024-01-01")));
        assert_eq!(streak.current(), 1);
    }

    #[test]
    fn same_day_is_idempotent() {
        let mut streak = StreakState::new();
        let day = DayKey::new("2024-01-01");
        streak.record_activity(&day);
        let before = streak.clone();
        assert!(!streak.record_activity(&day));
        assert_eq!(streak, before);
    }

    #[test]
    fn consecutive_day_increments() {
        let mut streak = StreakState::new();
        streak.record_activity(&DayKey::new("2024-01-01"));
        streak.record_activity(&DayKey::new("2024-01-02"));
        assert_eq!(streak.current(), 2);
    }

    #[test]
    fn gap_resets_to_one() {
        let mut streak = StreakState::new();
        streak.record_activity(&DayKey::new("2024-01-01"));
        streak.record_activity(&DayKey::new("2024-01-10"));
        assert_eq!(streak.current(), 1);
    }

    #[test]
    fn backdated_activity_is_ignored() {
        let mut streak = StreakState::new();
        streak.record_activity(&DayKey::new("2024-01-05"));
        streak.record_activity(&DayKey::new("2024-01-06"));
        assert!(!streak.record_activity(&DayKey::new("2024-01-02")));
        assert_eq!(streak.current(), 2);
        assert_eq!(streak.last_active(), Some(&DayKey::new("2024-01-06")));
    }

    #[test]
    fn unparseable_last_active_restarts() {
        let mut streak = StreakState::from_persisted(7, Some(DayKey::new("garbage")));
        assert!(streak.record_activity(&DayKey::new("2024-01-02")));
        assert_eq!(streak.current(), 1);
    }
}
