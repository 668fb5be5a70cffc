use thiserror::Error;

use crate::model::QuestionError;
use crate::model::SessionStateError;
use crate::model::TierLimitsError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Session(#[from] SessionStateError),
    #[error(transparent)]
    TierLimits(#[from] TierLimitsError),
}
