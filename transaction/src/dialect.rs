//! Control SQL emitted by the transaction layer.
//!
//! Everything else the session runs comes from the query builder; only the
//! statements below are produced here.

use std::fmt;

use crate::config::TransactionBehavior;
use crate::error::{TransactionError, TransactionResult};

/// Renders transaction control statements and migration bookkeeping SQL.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Dialect name, for diagnostics.
    fn name(&self) -> &'static str;

    /// `BEGIN [behavior]`.
    fn begin(&self, behavior: Option<TransactionBehavior>) -> TransactionResult<String> {
        Ok(match behavior {
            Some(b) => format!("BEGIN {}", b.as_sql()),
            None => "BEGIN".to_string(),
        })
    }

    fn commit(&self) -> String {
        "COMMIT".to_string()
    }

    fn rollback(&self) -> String {
        "ROLLBACK".to_string()
    }

    fn savepoint(&self, name: &str) -> String {
        format!("SAVEPOINT {}", name)
    }

    fn release_savepoint(&self, name: &str) -> String {
        format!("RELEASE SAVEPOINT {}", name)
    }

    fn rollback_to_savepoint(&self, name: &str) -> String {
        format!("ROLLBACK TO SAVEPOINT {}", name)
    }

    /// Quote an identifier.
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Create the migration journal table if missing.
    fn create_migrations_table(&self, table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY, hash text NOT NULL, created_at numeric)",
            self.quote_identifier(table)
        )
    }

    /// Select the most recently applied migration: `id, hash, created_at`.
    fn last_migration(&self, table: &str) -> String {
        format!(
            "SELECT id, hash, created_at FROM {} ORDER BY created_at DESC LIMIT 1",
            self.quote_identifier(table)
        )
    }

    /// Record an applied migration; binds `hash` then `created_at`.
    fn insert_migration(&self, table: &str) -> String {
        format!(
            "INSERT INTO {} (\"hash\", \"created_at\") VALUES (?, ?)",
            self.quote_identifier(table)
        )
    }
}

/// SQLite: supports DEFERRED, IMMEDIATE and EXCLUSIVE.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }
}

/// Engines whose BEGIN takes no locking behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiDialect;

impl Dialect for AnsiDialect {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn begin(&self, behavior: Option<TransactionBehavior>) -> TransactionResult<String> {
        match behavior {
            Some(b) => Err(TransactionError::unsupported_behavior(self.name(), b.name())),
            None => Ok("BEGIN".to_string()),
        }
    }
}
