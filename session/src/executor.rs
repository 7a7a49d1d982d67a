//! The execution capability.
//!
//! Anything that can run SQL with bound parameters and hand back one result
//! set per statement. Placeholder substitution, timeouts and the wire format
//! are the capability's business.

use std::sync::Arc;

use async_trait::async_trait;
use sqlnest_core::{ExecutionResult, ResultSet, Value};

/// One statement with its full, already-resolved parameter list.
#[derive(Debug, Clone, Copy)]
pub struct Statement<'a> {
    pub sql: &'a str,
    pub params: &'a [Value],
}

impl<'a> Statement<'a> {
    pub fn new(sql: &'a str, params: &'a [Value]) -> Self {
        Self { sql, params }
    }
}

/// Executes statements against the underlying store.
///
/// Implementations must run the statements in the order given and return
/// exactly one result set per statement, or fail. `read_only` is an
/// optimization hint only.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(
        &self,
        statements: &[Statement<'_>],
        read_only: bool,
    ) -> ExecutionResult<Vec<ResultSet>>;
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for Arc<E> {
    async fn execute(
        &self,
        statements: &[Statement<'_>],
        read_only: bool,
    ) -> ExecutionResult<Vec<ResultSet>> {
        (**self).execute(statements, read_only).await
    }
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for Box<E> {
    async fn execute(
        &self,
        statements: &[Statement<'_>],
        read_only: bool,
    ) -> ExecutionResult<Vec<ResultSet>> {
        (**self).execute(statements, read_only).await
    }
}
