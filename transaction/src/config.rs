//! Top-level transaction configuration.

use std::fmt;
use std::str::FromStr;

use crate::error::TransactionError;

/// Locking behavior requested when the top-level transaction begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionBehavior {
    /// Locks are acquired lazily on first access.
    Deferred,
    /// A write lock is acquired at BEGIN.
    Immediate,
    /// An exclusive lock is acquired at BEGIN.
    Exclusive,
}

impl TransactionBehavior {
    /// The SQL keyword for this behavior.
    pub fn as_sql(&self) -> &'static str {
        match self {
            TransactionBehavior::Deferred => "DEFERRED",
            TransactionBehavior::Immediate => "IMMEDIATE",
            TransactionBehavior::Exclusive => "EXCLUSIVE",
        }
    }

    /// Lowercase name, as accepted by `from_str`.
    pub fn name(&self) -> &'static str {
        match self {
            TransactionBehavior::Deferred => "deferred",
            TransactionBehavior::Immediate => "immediate",
            TransactionBehavior::Exclusive => "exclusive",
        }
    }
}

impl fmt::Display for TransactionBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransactionBehavior {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deferred" => Ok(TransactionBehavior::Deferred),
            "immediate" => Ok(TransactionBehavior::Immediate),
            "exclusive" => Ok(TransactionBehavior::Exclusive),
            _ => Err(TransactionError::UnknownBehavior(s.to_string())),
        }
    }
}

/// Options for a top-level transaction. Nested scopes take no options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionConfig {
    /// BEGIN behavior; `None` issues a bare BEGIN.
    pub behavior: Option<TransactionBehavior>,
}

impl TransactionConfig {
    /// Configuration with a BEGIN behavior.
    pub fn behavior(behavior: TransactionBehavior) -> Self {
        Self {
            behavior: Some(behavior),
        }
    }
}
