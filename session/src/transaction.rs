//! Transaction handles and the scope runner.
//!
//! Both the top-level transaction and every savepoint go through
//! [`run_scope`]: open the scope, run the body, then issue exactly one of the
//! scope's commit or rollback statements.

use futures::future::BoxFuture;
use sqlnest_core::{Query, ResultSet, Row};
use sqlnest_transaction::{Scope, ScopeKind, ScopeState};

use crate::error::{SessionError, SessionResult};
use crate::executor::Executor;
use crate::prepared::PreparedQuery;
use crate::session::{RelationalSchema, Session};

/// Future returned by a transaction body.
pub type BodyFuture<'t, T, E> = BoxFuture<'t, Result<T, E>>;

/// Handle yielded to a transaction body.
///
/// Valid only while the body runs. Queries issued through it run inside the
/// scope; [`Transaction::transaction`] opens a savepoint below it.
pub struct Transaction<'s, C> {
    session: &'s Session<C>,
    scope: Scope,
}

impl<'s, C: Executor> Transaction<'s, C> {
    /// Nesting index: 0 for the top level, parent + 1 for each savepoint.
    pub fn nesting_index(&self) -> u32 {
        self.scope.index()
    }

    /// Savepoint name, `None` at the top level.
    pub fn savepoint(&self) -> Option<String> {
        self.scope.kind().savepoint()
    }

    pub fn state(&self) -> ScopeState {
        self.scope.state()
    }

    pub fn schema(&self) -> Option<&RelationalSchema> {
        self.session.schema()
    }

    pub fn prepare(&self, query: Query) -> PreparedQuery<'_> {
        self.session.prepare(query)
    }

    pub async fn run(&self, query: Query) -> SessionResult<ResultSet> {
        self.session.run(query).await
    }

    pub async fn all(&self, query: Query) -> SessionResult<Vec<Row>> {
        self.session.all(query).await
    }

    pub async fn get(&self, query: Query) -> SessionResult<Option<Row>> {
        self.session.get(query).await
    }

    pub async fn values(&self, query: Query) -> SessionResult<Vec<Row>> {
        self.session.values(query).await
    }

    /// Abandon this scope. Return the result from the body:
    ///
    /// ```ignore
    /// |tx| Box::pin(async move {
    ///     if stale { return tx.rollback(); }
    ///     Ok(())
    /// })
    /// ```
    pub fn rollback<T>(&self) -> SessionResult<T> {
        Err(SessionError::RollbackRequested)
    }

    /// Run `body` inside a savepoint nested one level below this scope.
    ///
    /// `SAVEPOINT sp<n>` opens it, `RELEASE SAVEPOINT sp<n>` ends it on
    /// success and `ROLLBACK TO SAVEPOINT sp<n>` on failure. The failure
    /// is returned to this scope's body, which decides whether to recover.
    pub async fn transaction<T, E, F>(&mut self, body: F) -> Result<T, E>
    where
        T: Send,
        E: From<SessionError> + std::error::Error + Send + Sync + 'static,
        F: for<'t> FnOnce(&'t mut Transaction<'s, C>) -> BodyFuture<'t, T, E> + Send,
    {
        run_scope(self.session, self.scope.kind().child(), body).await
    }

    /// Roll the scope back after `cause`, returning the error to raise.
    async fn abort<E>(&mut self, cause: E) -> E
    where
        E: From<SessionError> + std::error::Error + Send + Sync + 'static,
    {
        let sql = self.scope.kind().rollback_sql(self.session.dialect());
        match self.session.run_control(&sql).await {
            Ok(_) => {
                if let Err(err) = self.scope.roll_back() {
                    log::debug!("scope {}: {}", self.scope.index(), err);
                }
                log::warn!("scope {} rolled back: {}", self.scope.index(), cause);
                cause
            }
            Err(rollback) => {
                log::error!(
                    "scope {} failed to roll back after \"{}\": {}",
                    self.scope.index(),
                    cause,
                    rollback
                );
                E::from(SessionError::rollback_failed(rollback, cause))
            }
        }
    }
}

/// Open a scope of `kind`, run `body` in it, and terminate it.
pub(crate) async fn run_scope<'s, C, T, E, F>(
    session: &'s Session<C>,
    kind: ScopeKind,
    body: F,
) -> Result<T, E>
where
    C: Executor,
    T: Send,
    E: From<SessionError> + std::error::Error + Send + Sync + 'static,
    F: for<'t> FnOnce(&'t mut Transaction<'s, C>) -> BodyFuture<'t, T, E> + Send,
{
    let open = kind
        .open_sql(session.dialect())
        .map_err(|err| E::from(SessionError::from(err)))?;
    session
        .run_control(&open)
        .await
        .map_err(|err| E::from(SessionError::from(err)))?;

    let mut tx = Transaction {
        session,
        scope: Scope::opened(kind),
    };

    let outcome = body(&mut tx).await;
    let value = match outcome {
        Ok(value) => value,
        Err(err) => return Err(tx.abort(err).await),
    };

    let commit = kind.commit_sql(session.dialect());
    if let Err(err) = session.run_control(&commit).await {
        return Err(tx.abort(E::from(SessionError::from(err))).await);
    }
    tx.scope
        .commit()
        .map_err(|err| E::from(SessionError::from(err)))?;

    Ok(value)
}

impl<'s, C> std::fmt::Debug for Transaction<'s, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
