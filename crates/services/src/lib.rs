#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod events;
pub mod gate;
pub mod identity;
pub mod quota_ledger;
pub mod session_tracker;
pub mod streak_service;
pub mod sync_bridge;
pub mod tier_resolver;

pub use practice_core::Clock;

pub use engine::{EngineConfig, PracticeEngine};
pub use error::{EngineError, GateError, IdentityError};
pub use events::{EngineEvent, EventBus};
pub use gate::GateController;
pub use identity::{IdentityGateway, SyncTrigger, User};
pub use quota_ledger::QuotaLedger;
pub use session_tracker::{AnswerOutcome, SessionProgress, SessionTracker};
pub use streak_service::StreakService;
pub use sync_bridge::SyncBridge;
pub use tier_resolver::TierResolver;
