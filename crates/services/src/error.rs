//! Shared error types for the services crate.

use thiserror::Error;

use practice_core::model::{GateState, SessionStateError};

/// Errors emitted by the identity/sync gateway.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IdentityError {
    #[error("identity gateway is not configured")]
    Disabled,

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("identity request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `GateController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GateError {
    #[error("no account gate is currently active")]
    NotGated,

    #[error("enter a valid email address")]
    InvalidEmail,

    #[error("could not send sign-in link: {0}")]
    LinkDispatch(#[source] IdentityError),
}

/// Errors emitted by `PracticeEngine`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The daily allowance is used up; `gate` says which modal to present.
    #[error("daily question allowance exhausted")]
    QuotaExhausted { gate: GateState },

    /// Every question in today's shuffled order has been answered.
    /// Distinct from quota exhaustion.
    #[error("today's session is already complete")]
    SessionComplete,

    /// A gate is active; answering is blocked until it resolves.
    #[error("a gate is active; answering is blocked")]
    Gated { gate: GateState },

    #[error(transparent)]
    Gate(#[from] GateError),
}

impl From<SessionStateError> for EngineError {
    fn from(err: SessionStateError) -> Self {
        match err {
            SessionStateError::Complete => Self::SessionComplete,
            // Other variants only arise during rehydration, which the
            // tracker resolves by starting a fresh session.
            _ => Self::SessionComplete,
        }
    }
}
