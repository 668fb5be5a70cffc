mod gate;
mod ids;
mod question;
mod quota;
mod session;
mod streak;
mod tier;

pub use ids::{OptionId, QuestionId, Surface};

pub use gate::GateState;
pub use question::{QuestionError, QuestionRecord};
pub use quota::QuotaRecord;
pub use session::{SessionState, SessionStateError};
pub use streak::StreakState;
pub use tier::{Tier, TierLimits, TierLimitsError, TierState};
