use practice_core::DayKey;
use practice_core::model::Surface;

/// Namespace prefix shared by every canonical key.
const PREFIX: &str = "pq";

/// Canonical and legacy storage keys for one surface.
///
/// Each surface (daily practice, emergency practice, ...) gets a disjoint
/// key prefix so its quota, session and streak records never
/// cross-contaminate another surface's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    surface: Surface,
}

impl KeySpace {
    #[must_use]
    pub fn new(surface: Surface) -> Self {
        Self { surface }
    }

    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Prefix under which every canonical record of this surface lives.
    #[must_use]
    pub fn prefix(&self) -> String {
        format!("{PREFIX}:{}:", self.surface)
    }

    /// Today's resumable session state.
    #[must_use]
    pub fn session(&self) -> String {
        format!("{PREFIX}:{}:session", self.surface)
    }

    /// Today's quota record.
    #[must_use]
    pub fn quota(&self) -> String {
        format!("{PREFIX}:{}:quota", self.surface)
    }

    /// The day-streak record.
    #[must_use]
    pub fn streak(&self) -> String {
        format!("{PREFIX}:{}:streak", self.surface)
    }

    /// Locally cached paid-entitlement hint. Spoofable; a hint only.
    #[must_use]
    pub fn paid_hint(&self) -> String {
        format!("{PREFIX}:{}:paid", self.surface)
    }

    /// Legacy per-day quota key variants, newest schema first.
    ///
    /// Tolerated on read so a schema change never resets a visitor's count;
    /// normalized to the canonical [`KeySpace::quota`] key on next write.
    #[must_use]
    pub fn legacy_quota_keys(&self, day: &DayKey) -> [String; 2] {
        [
            format!("{PREFIX}:{}:quota:{day}", self.surface),
            format!("{}-count-{day}", self.surface),
        ]
    }
}
