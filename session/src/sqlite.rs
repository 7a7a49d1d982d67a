//! SQLite execution capability backed by `rusqlite`.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, ErrorCode};
use sqlnest_core::{ExecutionError, ExecutionResult, ResultSet, Row, Value};
use tokio::sync::Mutex;

use crate::executor::{Executor, Statement};

/// Runs statements on one SQLite connection.
///
/// The connection is blocking; every call moves to the blocking pool.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteExecutor {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> ExecutionResult<Self> {
        Connection::open(path).map(Self::new).map_err(from_sqlite)
    }

    pub fn open_in_memory() -> ExecutionResult<Self> {
        Connection::open_in_memory()
            .map(Self::new)
            .map_err(from_sqlite)
    }
}

#[async_trait]
impl Executor for SqliteExecutor {
    async fn execute(
        &self,
        statements: &[Statement<'_>],
        _read_only: bool,
    ) -> ExecutionResult<Vec<ResultSet>> {
        let owned: Vec<(String, Vec<SqlValue>)> = statements
            .iter()
            .map(|s| (s.sql.to_string(), s.params.iter().map(to_sqlite).collect()))
            .collect();

        let conn = self.conn.clone().lock_owned().await;
        tokio::task::spawn_blocking(move || {
            owned
                .iter()
                .map(|(sql, params)| run_statement(&conn, sql, params))
                .collect::<ExecutionResult<Vec<_>>>()
        })
        .await
        .map_err(ExecutionError::driver)?
    }
}

fn run_statement(conn: &Connection, sql: &str, params: &[SqlValue]) -> ExecutionResult<ResultSet> {
    let mut stmt = conn.prepare(sql).map_err(from_sqlite)?;
    let column_count = stmt.column_count();
    let writes_rows = !stmt.readonly() && is_row_write(sql);

    if column_count == 0 {
        stmt.execute(params_from_iter(params.iter()))
            .map_err(from_sqlite)?;
        let (changes, last_insert_id) = write_metadata(conn, writes_rows);
        return Ok(ResultSet::affected(changes, last_insert_id));
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows: Vec<Row> = Vec::new();
    let mut cursor = stmt
        .query(params_from_iter(params.iter()))
        .map_err(from_sqlite)?;
    while let Some(row) = cursor.next().map_err(from_sqlite)? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            values.push(from_value_ref(row.get_ref(i).map_err(from_sqlite)?));
        }
        rows.push(values);
    }
    drop(cursor);

    let mut result = ResultSet::new(columns, rows);
    (result.rows_affected, result.last_insert_id) = write_metadata(conn, writes_rows);
    Ok(result)
}

// sqlite3_changes keeps the count of the last INSERT/UPDATE/DELETE, so it only
// describes the current statement when that statement is one of them.
fn write_metadata(conn: &Connection, writes_rows: bool) -> (u64, Option<i64>) {
    if !writes_rows {
        return (0, None);
    }
    let changes = conn.changes() as u64;
    let last_insert_id = (changes > 0).then(|| conn.last_insert_rowid());
    (changes, last_insert_id)
}

/// INSERT, UPDATE, DELETE, REPLACE, or a CTE in front of one.
fn is_row_write(sql: &str) -> bool {
    let keyword = sql
        .trim_start()
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    ["INSERT", "UPDATE", "DELETE", "REPLACE", "WITH"]
        .iter()
        .any(|k| keyword.eq_ignore_ascii_case(k))
}

fn to_sqlite(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Integer(n) | Value::Timestamp(n) => SqlValue::Integer(*n),
        Value::Real(f) => SqlValue::Real(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Blob(b) => SqlValue::Blob(b.clone()),
        Value::Json(j) => SqlValue::Text(j.to_string()),
    }
}

fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Integer(n),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

fn from_sqlite(err: rusqlite::Error) -> ExecutionError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message) => {
            let message = message
                .clone()
                .unwrap_or_else(|| failure.to_string());
            classify(failure.code, message)
        }
        rusqlite::Error::SqlInputError { error, msg, .. } => classify(error.code, msg.clone()),
        _ => ExecutionError::driver(err),
    }
}

fn classify(code: ErrorCode, message: String) -> ExecutionError {
    match code {
        ErrorCode::ConstraintViolation => ExecutionError::constraint_violation(message),
        ErrorCode::CannotOpen | ErrorCode::NotADatabase => ExecutionError::connection(message),
        _ => ExecutionError::rejected(message),
    }
}
