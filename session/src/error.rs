//! Session error types.

use sqlnest_core::{BoxError, ExecutionError, MapError};
use sqlnest_transaction::TransactionError;
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The capability rejected a statement.
    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Parameters could not be filled or a row could not be mapped.
    #[error("mapping error: {0}")]
    Map(#[from] MapError),

    /// Scope misuse or an unsupported BEGIN behavior.
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// A transaction body failed; the original failure is the source.
    #[error("transaction aborted: {cause}")]
    TransactionAborted {
        #[source]
        cause: BoxError,
    },

    /// The rollback issued after an abort failed as well.
    #[error("rollback failed: {rollback}; {aborted}")]
    RollbackFailed {
        rollback: ExecutionError,
        #[source]
        aborted: Box<SessionError>,
    },

    /// Returned by `Transaction::rollback` to roll the scope back on purpose.
    #[error("rollback requested")]
    RollbackRequested,

    /// Migration bookkeeping failed.
    #[error("migration error: {message}")]
    Migration { message: String },
}

impl SessionError {
    /// Wrap a failed body's error.
    pub fn aborted<E>(cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::TransactionAborted {
            cause: Box::new(cause),
        }
    }

    /// A rollback failure, keeping the abort that triggered it.
    pub fn rollback_failed<E>(rollback: ExecutionError, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RollbackFailed {
            rollback,
            aborted: Box::new(Self::aborted(cause)),
        }
    }

    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }

    /// The original failure behind an abort or a failed rollback.
    pub fn abort_cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::TransactionAborted { cause } => Some(cause.as_ref()),
            Self::RollbackFailed { aborted, .. } => aborted.abort_cause(),
            _ => None,
        }
    }

    /// Take the original failure behind an abort or a failed rollback.
    pub fn into_abort_cause(self) -> Option<BoxError> {
        match self {
            Self::TransactionAborted { cause } => Some(cause),
            Self::RollbackFailed { aborted, .. } => aborted.into_abort_cause(),
            _ => None,
        }
    }

    /// The failed rollback statement's error, if this is a rollback failure.
    pub fn rollback_error(&self) -> Option<&ExecutionError> {
        match self {
            Self::RollbackFailed { rollback, .. } => Some(rollback),
            _ => None,
        }
    }

    pub fn is_rollback_requested(&self) -> bool {
        matches!(self, Self::RollbackRequested)
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
