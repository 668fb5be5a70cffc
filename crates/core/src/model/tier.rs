use thiserror::Error;

/// Entitlement level of the current visitor, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// No account, no unlock: base daily ceiling.
    Anonymous,
    /// Anonymous visitor holding a one-time unlock for today.
    Unlocked,
    /// Signed-in account: extended daily ceiling.
    Authenticated,
    /// Paid plan: unlimited questions.
    Paid,
}

/// Live entitlement signals, derived each evaluation and never persisted.
///
/// `is_paid` folds in a locally cached flag, which is a spoofable client
/// hint and not a security boundary; the server remains the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierState {
    pub is_authenticated: bool,
    pub is_paid: bool,
    pub account_unlock: bool,
}

impl TierState {
    /// Highest tier the signals support.
    #[must_use]
    pub fn tier(&self) -> Tier {
        if self.is_paid {
            Tier::Paid
        } else if self.is_authenticated {
            Tier::Authenticated
        } else if self.account_unlock {
            Tier::Unlocked
        } else {
            Tier::Anonymous
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TierLimitsError {
    #[error("extended ceiling ({extended}) is below the base ceiling ({base})")]
    NotMonotonic { base: u32, extended: u32 },
}

/// Per-surface daily question ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLimits {
    base: u32,
    extended: u32,
}

impl TierLimits {
    /// Build ceilings, enforcing that the extended ceiling is at least the
    /// base one so tier upgrades never shrink allowances.
    ///
    /// # Errors
    ///
    /// Returns `TierLimitsError::NotMonotonic` if `extended < base`.
    pub fn new(base: u32, extended: u32) -> Result<Self, TierLimitsError> {
        if extended < base {
            return Err(TierLimitsError::NotMonotonic { base, extended });
        }
        Ok(Self { base, extended })
    }

    #[must_use]
    pub fn base(&self) -> u32 {
        self.base
    }

    #[must_use]
    pub fn extended(&self) -> u32 {
        self.extended
    }

    /// Daily ceiling for a tier. Monotonic: a higher tier never has a lower
    /// ceiling.
    #[must_use]
    pub fn ceiling(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Anonymous => self.base,
            Tier::Unlocked | Tier::Authenticated => self.extended,
            Tier::Paid => u32::MAX,
        }
    }
}

impl Default for TierLimits {
    /// Base ceiling 5, extended ceiling 12.
    fn default() -> Self {
        Self {
            base: 5,
            extended: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_wins_over_everything() {
        let state = TierState {
            is_authenticated: true,
            is_paid: true,
            account_unlock: true,
        };
        assert_eq!(state.tier(), Tier::Paid);
    }

    #[test]
    fn unlock_alone_grants_extended_tier() {
        let state = TierState {
            is_authenticated: false,
            is_paid: false,
            account_unlock: true,
        };
        assert_eq!(state.tier(), Tier::Unlocked);
    }

    #[test]
    fn ceilings_are_monotonic_in_tier() {
        let limits = TierLimits::default();
        assert!(limits.ceiling(Tier::Anonymous) <= limits.ceiling(Tier::Unlocked));
        assert!(limits.ceiling(Tier::Unlocked) <= limits.ceiling(Tier::Authenticated));
        assert!(limits.ceiling(Tier::Authenticated) <= limits.ceiling(Tier::Paid));
    }

    #[test]
    fn inverted_limits_are_rejected() {
        let err = TierLimits::new(10, 3).unwrap_err();
        assert!(matches!(err, TierLimitsError::NotMonotonic { .. }));
    }
}
