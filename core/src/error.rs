//! Common error types for sqlnest.

use thiserror::Error;

/// Boxed error used to carry driver failures and foreign causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The execution capability rejected a statement.
///
/// Covers malformed SQL, constraint violations and connectivity loss.
/// These are always surfaced to the caller and never retried.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The engine refused the statement (syntax error, unknown table, ...).
    #[error("statement rejected: {message}")]
    Rejected { message: String },

    /// A constraint was violated.
    #[error("constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// The connection to the engine is gone.
    #[error("connection error: {message}")]
    Connection { message: String },

    /// The capability answered without a result set for the statement.
    #[error("no result set returned for statement")]
    NoResultSet,

    /// Any other driver failure.
    #[error("driver error: {0}")]
    Driver(#[source] BoxError),
}

impl ExecutionError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn driver(err: impl Into<BoxError>) -> Self {
        Self::Driver(err.into())
    }
}

/// Errors raised while preparing parameters or mapping result rows.
#[derive(Debug, Error)]
pub enum MapError {
    /// A named placeholder had no value supplied.
    #[error("no value for placeholder: {name}")]
    MissingPlaceholder { name: String },

    /// A field decoder could not convert a driver value.
    #[error("cannot decode {found} as {decoder} for field {field}")]
    Decode {
        field: String,
        decoder: &'static str,
        found: &'static str,
    },

    /// A JSON column held invalid JSON.
    #[error("invalid JSON in field {field}: {source}")]
    InvalidJson {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

impl MapError {
    pub fn missing_placeholder(name: impl Into<String>) -> Self {
        Self::MissingPlaceholder { name: name.into() }
    }
}

/// Result type for execution operations.
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Result type for mapping operations.
pub type MapResult<T> = Result<T, MapError>;
