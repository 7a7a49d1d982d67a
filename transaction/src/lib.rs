//! sqlnest Transaction
//!
//! Flat-engine transaction primitives and their nesting rules.
//!
//! Responsibilities:
//! - Describe top-level and savepoint scopes (nesting index, savepoint name)
//! - Enforce the per-scope state machine: Active → Committed | RolledBack
//! - Carry the caller's BEGIN behavior (deferred / immediate / exclusive)
//! - Render control statements (BEGIN, COMMIT, ROLLBACK, SAVEPOINT, ...)
//!   through a dialect

mod config;
mod dialect;
mod error;
mod scope;

pub use config::{TransactionBehavior, TransactionConfig};
pub use dialect::{AnsiDialect, Dialect, SqliteDialect};
pub use error::{TransactionError, TransactionResult};
pub use scope::{savepoint_name, Scope, ScopeKind, ScopeState};
