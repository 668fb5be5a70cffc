use crate::model::{Tier, TierLimits};

/// State machine deciding what blocks further questions once the daily
/// ceiling is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    /// Questions may be answered.
    #[default]
    Answering,
    /// Email capture offering a one-time unlock.
    GateAccount,
    /// Premium upsell: no further free questions today.
    GatePremium,
    /// Terminal for the day; no further action can extend the allowance.
    Locked,
}

impl GateState {
    /// Pure transition evaluation from today's usage and entitlement.
    ///
    /// - Allowance remaining keeps (or returns) the visitor in `Answering`.
    /// - An anonymous visitor still on the base allotment is offered the
    ///   account gate; once an extended allotment has been consumed the
    ///   account gate would grant nothing, so the upsell fires instead.
    /// - A paid visitor who somehow exhausts a finite ceiling is locked.
    #[must_use]
    pub fn evaluate(answered_today: u32, max_allowed: u32, tier: Tier, limits: &TierLimits) -> Self {
        if answered_today < max_allowed {
            return Self::Answering;
        }

        match tier {
            Tier::Anonymous if max_allowed <= limits.base() => Self::GateAccount,
            Tier::Paid => Self::Locked,
            _ => Self::GatePremium,
        }
    }

    #[must_use]
    pub fn is_gated(&self) -> bool {
        !matches!(self, Self::Answering)
    }
}
