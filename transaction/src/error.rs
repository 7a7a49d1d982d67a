//! Transaction error types.

use thiserror::Error;

use crate::scope::ScopeState;

/// Transaction errors.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// A scope was asked to leave a terminal state, or to terminate twice.
    #[error("illegal scope transition: {from:?} -> {to:?}")]
    IllegalTransition { from: ScopeState, to: ScopeState },

    /// The dialect cannot express the requested BEGIN behavior.
    #[error("transaction behavior not supported by {dialect}: {behavior}")]
    UnsupportedBehavior {
        dialect: &'static str,
        behavior: String,
    },

    /// A behavior string did not name a known behavior.
    #[error("unknown transaction behavior: {0}")]
    UnknownBehavior(String),
}

impl TransactionError {
    pub fn illegal_transition(from: ScopeState, to: ScopeState) -> Self {
        Self::IllegalTransition { from, to }
    }

    pub fn unsupported_behavior(dialect: &'static str, behavior: impl Into<String>) -> Self {
        Self::UnsupportedBehavior {
            dialect,
            behavior: behavior.into(),
        }
    }
}

/// Result type for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;
