use std::sync::Arc;

use practice_core::model::{SessionState, TierLimits, TierState};
use storage::{KeySpace, KeyValueStore};

use crate::identity::IdentityGateway;

/// Computes the visitor's current entitlement tier and question ceiling.
pub struct TierResolver {
    store: Arc<dyn KeyValueStore>,
    keys: KeySpace,
    identity: Arc<dyn IdentityGateway>,
    limits: TierLimits,
}

impl TierResolver {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        keys: KeySpace,
        identity: Arc<dyn IdentityGateway>,
        limits: TierLimits,
    ) -> Self {
        Self {
            store,
            keys,
            identity,
            limits,
        }
    }

    #[must_use]
    pub fn limits(&self) -> &TierLimits {
        &self.limits
    }

    /// Derive live entitlement signals from the cached auth snapshot, the
    /// local paid hint and the session's unlock ratchet.
    ///
    /// Either paid signal being true is sufficient. The local hint is
    /// spoofable and treated as a hint only; nothing security-relevant
    /// hangs off it.
    #[must_use]
    pub fn resolve(&self, session: &SessionState) -> TierState {
        let user = self.identity.current_user();
        let is_paid =
            self.cached_paid_hint() || user.as_ref().is_some_and(|u| u.has_paid_plan());

        TierState {
            is_authenticated: user.is_some(),
            is_paid,
            account_unlock: session.account_unlock(),
        }
    }

    /// Today's question ceiling for the resolved tier.
    ///
    /// Monotonic under tier transitions: never below the count already
    /// answered today, so an upgrade cannot strand the visitor below their
    /// own progress.
    #[must_use]
    pub fn max_allowed(&self, session: &SessionState) -> u32 {
        let ceiling = self.limits.ceiling(self.resolve(session).tier());
        ceiling.max(session.answered_count())
    }

    fn cached_paid_hint(&self) -> bool {
        match self.store.get(&self.keys.paid_hint()) {
            Ok(Some(raw)) => matches!(raw.trim(), "true" | "1"),
            _ => false,
        }
    }
}
