//! sqlnest Session
//!
//! Transactional SQL execution over an opaque execution capability.
//!
//! Responsibilities:
//! - Bind queries to the capability as prepared queries with four result
//!   shapes (execute, fetch_all, fetch_one, fetch_raw)
//! - Log every dispatched statement before it reaches the capability
//! - Run top-level transactions and savepoint-nested scopes, guaranteeing
//!   exactly one commit or rollback per opened scope
//! - Apply migrations through the same transaction machinery

mod error;
mod executor;
mod logger;
mod migrate;
mod prepared;
mod session;
#[cfg(feature = "sqlite")]
mod sqlite;
mod transaction;

pub use error::{SessionError, SessionResult};
pub use executor::{Executor, Statement};
pub use logger::{DefaultLogger, NoopLogger, QueryLogger, QUERY_LOG_TARGET};
pub use migrate::{
    MigrationConfig, MigrationMeta, MigrationRunner, Migrator, DEFAULT_MIGRATIONS_TABLE,
};
pub use prepared::{CustomMapping, FieldMapping, PreparedQuery, RawRows, ResultMapping};
pub use session::{RelationalSchema, Session, SessionOptions};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteExecutor;
pub use transaction::{BodyFuture, Transaction};

pub use sqlnest_core::{
    ExecutionError, MapError, Placeholders, Query, ResultSet, Row, SelectedField, Value,
};
pub use sqlnest_transaction::{TransactionBehavior, TransactionConfig};
