//! sqlnest integration test framework.
//!
//! A [`RecordingExecutor`] and a [`RecordingLogger`] write into one shared
//! [`Journal`], so tests can assert both the exact control SQL a session
//! issued and that every statement was logged before it was dispatched.


use sqlnest_session::{Session, SessionOptions};
use sqlnest_transaction::Dialect;

pub use error::{JournalError, JournalResult};
pub use executor::RecordingExecutor;
pub use journal::{Event, Journal, SavepointOp};
pub use logger::RecordingLogger;

/// Build a session over a scripted executor, logging into the same journal.
pub fn recording_session<F>(script: F) -> (Session<RecordingExecutor>, Journal)
where
    F: FnOnce(RecordingExecutor) -> RecordingExecutor,
{
    recording_session_with(SessionOptions::default(), script)
}

/// Like [`recording_session`], with a different control SQL dialect.
pub fn recording_session_for<D, F>(dialect: D, script: F) -> (Session<RecordingExecutor>, Journal)
where
    D: Dialect + 'static,
    F: FnOnce(RecordingExecutor) -> RecordingExecutor,
{
    recording_session_with(SessionOptions::default().with_dialect(dialect), script)
}

fn recording_session_with<F>(
    options: SessionOptions,
    script: F,
) -> (Session<RecordingExecutor>, Journal)
where
    F: FnOnce(RecordingExecutor) -> RecordingExecutor,
{
    let journal = Journal::new();
    let executor = script(RecordingExecutor::new(journal.clone()));
    let options = options.with_logger(RecordingLogger::new(journal.clone()));
    (Session::with_options(executor, options), journal)
}

/// Commonly used items for integration tests.
pub mod prelude {
    pub use crate::{
        recording_session, recording_session_for, Event, Journal, RecordingExecutor,
        RecordingLogger, SavepointOp,
    };
    pub use sqlnest_core::{
        row, ExecutionError, FieldDecoder, JoinNullability, Placeholders, Query, Record,
        RecordMap, ResultSet, Row, SelectedField, Value,
    };
    pub use sqlnest_session::{
        BodyFuture, MigrationConfig, MigrationMeta, RelationalSchema, Session, SessionError,
        SessionOptions, SessionResult, SqliteExecutor, Transaction, TransactionBehavior,
        TransactionConfig,
    };
    pub use sqlnest_transaction::{AnsiDialect, ScopeState, SqliteDialect};
}
