//! Migration runner.
//!
//! Migration discovery happens elsewhere; this module only applies
//! [`MigrationMeta`] entries that are newer than the last recorded one.

use async_trait::async_trait;
use sqlnest_core::{Query, Value};
use sqlnest_transaction::TransactionConfig;

use crate::error::{SessionError, SessionResult};
use crate::executor::Executor;
use crate::session::Session;

/// Default name of the migration journal table.
pub const DEFAULT_MIGRATIONS_TABLE: &str = "__sqlnest_migrations";

/// One migration, already split into statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationMeta {
    pub sql: Vec<String>,
    /// Creation time of the migration folder, in milliseconds.
    pub folder_millis: i64,
    pub hash: String,
}

impl MigrationMeta {
    pub fn new(sql: Vec<String>, folder_millis: i64, hash: impl Into<String>) -> Self {
        Self {
            sql,
            folder_millis,
            hash: hash.into(),
        }
    }
}

/// Migration settings.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub migrations_table: String,
}

impl MigrationConfig {
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.migrations_table = name.into();
        self
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migrations_table: DEFAULT_MIGRATIONS_TABLE.to_string(),
        }
    }
}

/// Applies migrations to a session.
#[async_trait]
pub trait MigrationRunner<C: Executor + 'static> {
    /// Apply what is pending; returns how many migrations ran.
    async fn run(&self, session: &mut Session<C>, migrations: &[MigrationMeta])
        -> SessionResult<usize>;
}

/// The default runner: one journal table, one transaction for the whole batch.
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    config: MigrationConfig,
}

impl Migrator {
    pub fn new(config: MigrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }
}

#[async_trait]
impl<C: Executor + 'static> MigrationRunner<C> for Migrator {
    async fn run(
        &self,
        session: &mut Session<C>,
        migrations: &[MigrationMeta],
    ) -> SessionResult<usize> {
        let table = self.config.migrations_table.as_str();
        let dialect = session.dialect();
        let create = dialect.create_migrations_table(table);
        let last = dialect.last_migration(table);
        let insert = dialect.insert_migration(table);

        session.run(Query::new(create)).await?;

        let last_applied = match session.get(Query::new(last)).await? {
            Some(row) => Some(created_at(row.get(2))?),
            None => None,
        };

        let pending: Vec<MigrationMeta> = migrations
            .iter()
            .filter(|m| last_applied.map_or(true, |last| last < m.folder_millis))
            .cloned()
            .collect();
        if pending.is_empty() {
            log::debug!("no pending migrations in {}", table);
            return Ok(0);
        }

        log::info!("applying {} migration(s) to {}", pending.len(), table);
        session
            .transaction(TransactionConfig::default(), move |tx| {
                Box::pin(async move {
                    let applied = pending.len();
                    for migration in pending {
                        for stmt in migration.sql.iter().filter(|s| !s.trim().is_empty()) {
                            tx.run(Query::new(stmt.as_str())).await?;
                        }
                        tx.run(
                            Query::new(insert.as_str())
                                .bind(migration.hash)
                                .bind(migration.folder_millis),
                        )
                        .await?;
                    }
                    Ok::<_, SessionError>(applied)
                })
            })
            .await
    }
}

/// Read the journal's `created_at`, stored as a numeric column.
fn created_at(value: Option<&Value>) -> SessionResult<i64> {
    match value {
        Some(Value::Integer(n)) | Some(Value::Timestamp(n)) => Ok(*n),
        Some(Value::Real(f)) => Ok(*f as i64),
        Some(Value::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| SessionError::migration(format!("invalid created_at \"{}\"", s))),
        Some(other) => Err(SessionError::migration(format!(
            "created_at has type {}",
            other.type_name()
        ))),
        None => Err(SessionError::migration("created_at column missing")),
    }
}
