use std::sync::Arc;

use practice_core::Clock;
use practice_core::model::{GateState, OptionId, QuestionRecord, StreakState, Surface, TierLimits};
use storage::{Bundle, KeySpace, KeyValueStore, StorageError};

use crate::error::EngineError;
use crate::events::{EngineEvent, EventBus};
use crate::gate::GateController;
use crate::identity::{IdentityGateway, SyncTrigger};
use crate::quota_ledger::QuotaLedger;
use crate::session_tracker::{AnswerOutcome, SessionProgress, SessionTracker};
use crate::streak_service::StreakService;
use crate::sync_bridge::SyncBridge;
use crate::tier_resolver::TierResolver;

/// Per-surface engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub surface: Surface,
    pub limits: TierLimits,
    /// URL the passwordless sign-in link redirects back to.
    pub redirect_to: String,
}

impl EngineConfig {
    #[must_use]
    pub fn new(surface: Surface, redirect_to: impl Into<String>) -> Self {
        Self {
            surface,
            limits: TierLimits::default(),
            redirect_to: redirect_to.into(),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: TierLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// The per-surface context object wiring ledger, tracker, streak, tier
/// resolution, gating and sync together.
///
/// Each surface (daily practice, emergency practice, ...) runs its own
/// instance over its own key namespace; instances share nothing but the
/// store and identity collaborators, so they cannot interfere.
pub struct PracticeEngine {
    store: Arc<dyn KeyValueStore>,
    keys: KeySpace,
    bus: EventBus,
    session: SessionTracker,
    quota: QuotaLedger,
    streak: StreakService,
    tiers: TierResolver,
    gate: GateController,
    sync: SyncBridge,
    identity: Arc<dyn IdentityGateway>,
    redirect_to: String,
    was_authenticated: bool,
}

impl PracticeEngine {
    /// Assemble the engine for one surface and load (or create) today's
    /// session. The gate is evaluated immediately so a visitor who already
    /// exhausted today's allowance is gated on load.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn KeyValueStore>,
        identity: Arc<dyn IdentityGateway>,
        questions: Vec<QuestionRecord>,
        clock: Clock,
    ) -> Self {
        let keys = KeySpace::new(config.surface);
        let bus = EventBus::new();

        let session = SessionTracker::load_or_create(
            Arc::clone(&store),
            keys.clone(),
            clock,
            questions,
        );
        let quota = QuotaLedger::new(Arc::clone(&store), keys.clone(), clock);
        let streak = StreakService::new(Arc::clone(&store), keys.clone(), clock, bus.clone());
        let tiers = TierResolver::new(
            Arc::clone(&store),
            keys.clone(),
            Arc::clone(&identity),
            config.limits,
        );
        let gate = GateController::new(Arc::clone(&identity), bus.clone());
        let sync = SyncBridge::new(Arc::clone(&store), keys.clone(), Arc::clone(&identity));
        let was_authenticated = identity.current_user().is_some();

        let mut engine = Self {
            store,
            keys,
            bus,
            session,
            quota,
            streak,
            tiers,
            gate,
            sync,
            identity,
            redirect_to: config.redirect_to,
            was_authenticated,
        };
        engine.reevaluate_gate();
        engine
    }

    /// The event bus rendering code subscribes to.
    #[must_use]
    pub fn events(&self) -> EventBus {
        self.bus.clone()
    }

    #[must_use]
    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.session.progress()
    }

    #[must_use]
    pub fn streak(&self) -> StreakState {
        self.streak.current()
    }

    /// The question under the cursor, or `None` when today's session is
    /// complete.
    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.session.current_question()
    }

    /// Questions left in today's allowance under the current tier.
    #[must_use]
    pub fn remaining_allowance(&self) -> u32 {
        self.tiers
            .max_allowed(self.session.state())
            .saturating_sub(self.quota.get_used())
    }

    /// Answer the current question: grade, advance, count against quota,
    /// update the streak, re-evaluate the gate and push best-effort.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Gated` when a gate was already active,
    /// `EngineError::QuotaExhausted` when this call trips the ceiling
    /// before answering, and `EngineError::SessionComplete` when every
    /// question is already answered.
    pub async fn answer(&mut self, chosen: &OptionId) -> Result<AnswerOutcome, EngineError> {
        let gate = self.gate.state();
        if gate.is_gated() {
            return Err(EngineError::Gated { gate });
        }

        let max_allowed = self.tiers.max_allowed(self.session.state());
        if self.quota.get_used() >= max_allowed {
            let gate = self.reevaluate_gate();
            return Err(EngineError::QuotaExhausted { gate });
        }

        let outcome = self.session.record_answer(chosen)?;
        self.quota.record_use();
        self.streak.record_activity();

        self.bus.emit(&EngineEvent::SessionUpdated {
            progress: self.session.progress(),
        });
        self.reevaluate_gate();
        self.sync.push_if_authenticated(SyncTrigger::AnswerRecorded).await;

        Ok(outcome)
    }

    /// Refresh the "next question" view from persisted state. Never moves
    /// the cursor.
    pub fn advance(&mut self) {
        self.session.advance();
    }

    /// Submit an email at the account gate.
    ///
    /// On success the one-time unlock is granted, the ceiling recomputed
    /// and the gate returns to `Answering` when allowance remains.
    ///
    /// # Errors
    ///
    /// Propagates `GateError`: invalid email and dispatch failures keep the
    /// visitor at the current gate with a user-facing message.
    pub async fn submit_gate_email(&mut self, email: &str) -> Result<GateState, EngineError> {
        let answered_today = self.quota.get_used();
        let state = self
            .gate
            .submit_email(
                email,
                &self.redirect_to,
                &mut self.session,
                answered_today,
                &self.tiers,
            )
            .await?;

        let tier = self.tiers.resolve(self.session.state()).tier();
        self.bus.emit(&EngineEvent::TierChanged { tier });
        self.sync.push_if_authenticated(SyncTrigger::TierChanged).await;

        Ok(state)
    }

    /// React to an auth-state notification from the identity collaborator.
    ///
    /// On an unauthenticated → authenticated transition the bridge pulls
    /// first, so server-held progress supersedes local guesses before the
    /// gate is re-evaluated.
    pub async fn on_auth_state_changed(&mut self) {
        let signed_in = self.identity.current_user().is_some();
        self.bus.emit(&EngineEvent::AuthChanged { signed_in });

        if signed_in && !self.was_authenticated {
            if self.sync.pull_if_authenticated().await {
                self.session.advance();
            }
            self.sync.push_if_authenticated(SyncTrigger::SignIn).await;
        }
        self.was_authenticated = signed_in;

        let tier = self.tiers.resolve(self.session.state()).tier();
        self.bus.emit(&EngineEvent::TierChanged { tier });
        self.reevaluate_gate();
    }

    /// Export every persisted record of this surface as one bundle.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the store cannot be enumerated.
    pub fn export_snapshot(&self) -> Result<Bundle, StorageError> {
        storage::export_snapshot(self.store.as_ref(), &self.keys)
    }

    /// Merge an externally supplied bundle over local state (backup
    /// restore, cross-device import), then refresh the session view and
    /// re-evaluate the gate.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the store cannot be written.
    pub fn import_snapshot(&mut self, bundle: &Bundle) -> Result<(), StorageError> {
        storage::import_snapshot(self.store.as_ref(), bundle)?;
        self.session.advance();
        self.bus.emit(&EngineEvent::SessionUpdated {
            progress: self.session.progress(),
        });
        self.reevaluate_gate();
        Ok(())
    }

    fn reevaluate_gate(&mut self) -> GateState {
        let state = self.session.state();
        let tier = self.tiers.resolve(state).tier();
        let max_allowed = self.tiers.max_allowed(state);
        let used = self.quota.get_used();
        self.gate.evaluate(used, max_allowed, tier, self.tiers.limits())
    }
}
