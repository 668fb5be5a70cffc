use std::sync::Arc;

use practice_core::model::{GateState, Tier, TierLimits};

use crate::error::GateError;
use crate::events::{EngineEvent, EventBus};
use crate::identity::IdentityGateway;
use crate::session_tracker::SessionTracker;
use crate::tier_resolver::TierResolver;

/// Decides which modal blocks further questions once the ceiling is
/// reached, and runs the email-capture flow that grants the one-time
/// unlock.
pub struct GateController {
    state: GateState,
    identity: Arc<dyn IdentityGateway>,
    bus: EventBus,
}

impl GateController {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityGateway>, bus: EventBus) -> Self {
        Self {
            state: GateState::Answering,
            identity,
            bus,
        }
    }

    #[must_use]
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Re-run the transition function and publish a change if any.
    pub fn evaluate(
        &mut self,
        answered_today: u32,
        max_allowed: u32,
        tier: Tier,
        limits: &TierLimits,
    ) -> GateState {
        let next = GateState::evaluate(answered_today, max_allowed, tier, limits);
        if next != self.state {
            self.state = next;
            self.bus.emit(&EngineEvent::GateChanged { state: next });
        }
        next
    }

    /// Accept an email at the account gate: dispatch a passwordless
    /// sign-in link, ratchet the session's unlock, and return to
    /// `Answering` when allowance remains.
    ///
    /// # Errors
    ///
    /// Returns `GateError::NotGated` outside the account gate,
    /// `GateError::InvalidEmail` for a malformed address (no state
    /// mutation), and `GateError::LinkDispatch` when the identity service
    /// fails — in which case the visitor stays at the current gate.
    pub async fn submit_email(
        &mut self,
        email: &str,
        redirect_to: &str,
        session: &mut SessionTracker,
        answered_today: u32,
        tiers: &TierResolver,
    ) -> Result<GateState, GateError> {
        if self.state != GateState::GateAccount {
            return Err(GateError::NotGated);
        }
        if !is_plausible_email(email) {
            return Err(GateError::InvalidEmail);
        }

        self.identity
            .send_sign_in_link(email, redirect_to)
            .await
            .map_err(GateError::LinkDispatch)?;

        session.grant_account_unlock();

        let tier_state = tiers.resolve(session.state());
        let max_allowed = tiers.max_allowed(session.state());
        Ok(self.evaluate(answered_today, max_allowed, tier_state.tier(), tiers.limits()))
    }
}

/// Cheap shape check; the identity service performs real validation.
fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}
