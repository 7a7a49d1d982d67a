//! Session manager.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sqlnest_core::{ExecutionResult, Query, ResultSet, Row};
use sqlnest_transaction::{Dialect, ScopeKind, SqliteDialect, TransactionConfig};

use crate::error::{SessionError, SessionResult};
use crate::executor::Executor;
use crate::logger::{DefaultLogger, NoopLogger, QueryLogger};
use crate::migrate::{MigrationConfig, MigrationMeta, MigrationRunner, Migrator};
use crate::prepared::PreparedQuery;
use crate::transaction::{run_scope, BodyFuture, Transaction};

/// Relational metadata handed down from the schema layer. Read-only here.
#[derive(Debug, Clone, Default)]
pub struct RelationalSchema {
    /// Schema key -> database table name.
    table_names: HashMap<String, String>,
}

impl RelationalSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, key: impl Into<String>, table_name: impl Into<String>) -> Self {
        self.table_names.insert(key.into(), table_name.into());
        self
    }

    /// Database table name for a schema key.
    pub fn table_name(&self, key: &str) -> Option<&str> {
        self.table_names.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table_names.is_empty()
    }
}

/// Session construction options.
#[derive(Clone)]
pub struct SessionOptions {
    logger: Arc<dyn QueryLogger>,
    dialect: Arc<dyn Dialect>,
    schema: Option<Arc<RelationalSchema>>,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: impl QueryLogger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// `true` installs the [`DefaultLogger`], `false` the [`NoopLogger`].
    pub fn logging(self, enabled: bool) -> Self {
        if enabled {
            self.with_logger(DefaultLogger::new())
        } else {
            self.with_logger(NoopLogger)
        }
    }

    pub fn with_dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Arc::new(dialect);
        self
    }

    pub fn with_schema(mut self, schema: RelationalSchema) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            logger: Arc::new(NoopLogger),
            dialect: Arc::new(SqliteDialect),
            schema: None,
        }
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("dialect", &self.dialect.name())
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// A session over one execution capability.
///
/// The session owns the capability for its whole life. Opening a transaction
/// borrows the session mutably, so nothing else can dispatch through it until
/// the outermost scope has committed or rolled back.
pub struct Session<C> {
    /// The execution capability.
    client: C,
    /// Renders control SQL.
    dialect: Arc<dyn Dialect>,
    /// Receives every statement before dispatch.
    logger: Arc<dyn QueryLogger>,
    /// Optional relational metadata.
    schema: Option<Arc<RelationalSchema>>,
}

impl<C: Executor> Session<C> {
    /// Create a session with default options: SQLite control SQL, no logging.
    pub fn new(client: C) -> Self {
        Self::with_options(client, SessionOptions::default())
    }

    pub fn with_options(client: C, options: SessionOptions) -> Self {
        Self {
            client,
            dialect: options.dialect,
            logger: options.logger,
            schema: options.schema,
        }
    }

    /// Get the execution capability.
    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn schema(&self) -> Option<&RelationalSchema> {
        self.schema.as_deref()
    }

    /// Bind a query to this session's capability.
    pub fn prepare(&self, query: Query) -> PreparedQuery<'_> {
        PreparedQuery::new(&self.client, self.logger.as_ref(), query)
    }

    /// Prepare and execute for side effect.
    pub async fn run(&self, query: Query) -> SessionResult<ResultSet> {
        self.prepare(query).execute().await
    }

    /// Prepare and fetch every row.
    pub async fn all(&self, query: Query) -> SessionResult<Vec<Row>> {
        self.prepare(query).fetch_all().await
    }

    /// Prepare and fetch the first row, if any.
    pub async fn get(&self, query: Query) -> SessionResult<Option<Row>> {
        self.prepare(query).fetch_one().await
    }

    /// Prepare and fetch raw positional rows.
    pub async fn values(&self, query: Query) -> SessionResult<Vec<Row>> {
        self.prepare(query).fetch_raw().await
    }

    /// Run `body` inside a top-level transaction.
    ///
    /// Issues `BEGIN [behavior]`, hands the body a handle at nesting index 0,
    /// then `COMMIT`s on success. A failed body or a failed `COMMIT` is
    /// followed by `ROLLBACK` and the failure is returned; if the rollback
    /// fails too, both errors are reported through
    /// [`SessionError::RollbackFailed`].
    ///
    /// ```ignore
    /// let count = session
    ///     .transaction(TransactionConfig::default(), |tx| {
    ///         Box::pin(async move {
    ///             tx.run(Query::new("INSERT INTO t (id) VALUES (?)").bind(1)).await?;
    ///             Ok::<_, SessionError>(1)
    ///         })
    ///     })
    ///     .await?;
    /// ```
    pub async fn transaction<'s, T, E, F>(
        &'s mut self,
        config: TransactionConfig,
        body: F,
    ) -> Result<T, E>
    where
        T: Send,
        E: From<SessionError> + std::error::Error + Send + Sync + 'static,
        F: for<'t> FnOnce(&'t mut Transaction<'s, C>) -> BodyFuture<'t, T, E> + Send,
    {
        let kind = ScopeKind::TopLevel {
            behavior: config.behavior,
        };
        run_scope(&*self, kind, body).await
    }

    /// Apply pending migrations with the default [`Migrator`].
    pub async fn migrate(
        &mut self,
        migrations: &[MigrationMeta],
        config: MigrationConfig,
    ) -> SessionResult<usize>
    where
        C: 'static,
    {
        Migrator::new(config).run(self, migrations).await
    }

    /// Log and dispatch one control statement.
    pub(crate) async fn run_control(&self, sql: &str) -> ExecutionResult<ResultSet> {
        log::debug!("{}", sql);
        self.prepare(Query::new(sql)).dispatch_values(&[]).await
    }
}

impl<C> fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("dialect", &self.dialect.name())
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
