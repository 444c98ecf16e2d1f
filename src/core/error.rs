//! Engine error taxonomy.
//!
//! Every fallible public operation returns [`EngineResult`]. The variants map
//! onto four recovery policies:
//!
//! - `IllegalAction`: the request is rejected, state is unchanged.
//! - `InvalidResponse`: the prompt stays outstanding and the player is re-asked.
//! - `Misconfigured`: the offending ability is skipped and the match goes on.
//! - `InvariantViolation`: the match is terminated and never retried.
//!
//! `InvalidConfig` and `Snapshot` cover setup and restore, `Terminated` is
//! returned by every operation on a match that has already been stopped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by the resolution core.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The requested action is not legal in the current phase or window.
    #[error("illegal action: {0}")]
    IllegalAction(String),

    /// A prompt answer failed validation.
    #[error("invalid prompt response: {0}")]
    InvalidResponse(#[from] ResponseRejection),

    /// An ability or card script could not run as declared.
    #[error("misconfigured ability: {0}")]
    Misconfigured(String),

    /// Match state is corrupted; the match cannot continue.
    #[error("engine invariant violated: {0}")]
    InvariantViolation(String),

    /// The match configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The match has been terminated and accepts no further input.
    #[error("match terminated: {0}")]
    Terminated(String),

    /// A snapshot could not be taken, encoded, or restored.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl EngineError {
    /// Whether this error ends the match.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::InvariantViolation(_))
    }

    pub(crate) fn illegal(message: impl Into<String>) -> Self {
        EngineError::IllegalAction(message.into())
    }

    pub(crate) fn misconfigured(message: impl Into<String>) -> Self {
        EngineError::Misconfigured(message.into())
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        EngineError::InvariantViolation(message.into())
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        EngineError::InvalidConfig(message.into())
    }
}

/// Why a prompt answer was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ResponseRejection {
    #[error("no such prompt")]
    UnknownPrompt,
    #[error("prompt belongs to another player")]
    NotOwner,
    #[error("prompt has already been answered")]
    AlreadyResolved,
    #[error("prompt is not the active prompt")]
    NotActive,
    #[error("answer does not fit the prompt kind")]
    WrongKind,
    #[error("card is not a legal choice")]
    InvalidCard,
    #[error("card chosen more than once")]
    DuplicateCard,
    #[error("too few cards chosen: need at least {min}, got {got}")]
    TooFew { min: usize, got: usize },
    #[error("too many cards chosen: at most {max}, got {got}")]
    TooMany { max: usize, got: usize },
    #[error("no such menu button")]
    NoSuchButton,
    #[error("prompt has no done option")]
    DoneNotAllowed,
}
