//! Prepared queries.
//!
//! A prepared query binds one [`Query`] to the session's capability and
//! logger. Every operation is a fresh, self-contained dispatch: parameters
//! are resolved, logged once, and sent in full. All shapes share the same
//! raw-values dispatch; a [`ResultMapping`] post-processes the rows.

use std::fmt;
use std::marker::PhantomData;

use sqlnest_core::{
    map_result_row, map_result_rows, ExecutionError, ExecutionResult, JoinNullability, MapResult,
    Placeholders, Query, RecordMap, ResultSet, Row, SelectedField, Value,
};

use crate::error::SessionResult;
use crate::executor::{Executor, Statement};
use crate::logger::QueryLogger;

/// Post-processing applied to the raw rows of `fetch_all` / `fetch_one`.
pub trait ResultMapping: Send + Sync {
    /// Output of `fetch_all`.
    type All: Send;
    /// Output of `fetch_one`.
    type One: Send;

    fn map_all(&self, rows: Vec<Row>) -> MapResult<Self::All>;

    fn map_one(&self, rows: Vec<Row>) -> MapResult<Self::One>;
}

/// No fields and no mapper: rows are returned exactly as the capability sent them.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawRows;

impl ResultMapping for RawRows {
    type All = Vec<Row>;
    type One = Option<Row>;

    fn map_all(&self, rows: Vec<Row>) -> MapResult<Vec<Row>> {
        Ok(rows)
    }

    fn map_one(&self, rows: Vec<Row>) -> MapResult<Option<Row>> {
        Ok(rows.into_iter().next())
    }
}

/// Map each row through the selected fields.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    fields: Vec<SelectedField>,
    joins: Option<JoinNullability>,
}

impl FieldMapping {
    pub fn new(fields: Vec<SelectedField>, joins: Option<JoinNullability>) -> Self {
        Self { fields, joins }
    }

    pub fn fields(&self) -> &[SelectedField] {
        &self.fields
    }
}

impl ResultMapping for FieldMapping {
    type All = Vec<RecordMap>;
    type One = Option<RecordMap>;

    fn map_all(&self, rows: Vec<Row>) -> MapResult<Vec<RecordMap>> {
        map_result_rows(&self.fields, &rows, self.joins.as_ref())
    }

    fn map_one(&self, rows: Vec<Row>) -> MapResult<Option<RecordMap>> {
        rows.first()
            .map(|row| map_result_row(&self.fields, row, self.joins.as_ref()))
            .transpose()
    }
}

/// Hand the complete row set to a caller-supplied mapper.
///
/// `fetch_one` also passes every row, so a mapper can assemble a relational
/// tree from a single "get". With no rows at all, `fetch_one` yields `None`
/// without calling the mapper.
pub struct CustomMapping<F, T> {
    mapper: F,
    _output: PhantomData<fn() -> T>,
}

impl<F, T> CustomMapping<F, T>
where
    F: Fn(Vec<Row>) -> T + Send + Sync,
{
    pub fn new(mapper: F) -> Self {
        Self {
            mapper,
            _output: PhantomData,
        }
    }
}

impl<F, T> fmt::Debug for CustomMapping<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomMapping").finish_non_exhaustive()
    }
}

impl<F, T> ResultMapping for CustomMapping<F, T>
where
    F: Fn(Vec<Row>) -> T + Send + Sync,
    T: Send,
{
    type All = T;
    type One = Option<T>;

    fn map_all(&self, rows: Vec<Row>) -> MapResult<T> {
        Ok((self.mapper)(rows))
    }

    fn map_one(&self, rows: Vec<Row>) -> MapResult<Option<T>> {
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some((self.mapper)(rows)))
    }
}

/// One parameterized statement bound to a capability.
pub struct PreparedQuery<'a, M = RawRows> {
    executor: &'a dyn Executor,
    logger: &'a dyn QueryLogger,
    query: Query,
    mapping: M,
    placeholders: Option<Placeholders>,
    read_only: bool,
}

impl<'a> PreparedQuery<'a, RawRows> {
    pub(crate) fn new(
        executor: &'a dyn Executor,
        logger: &'a dyn QueryLogger,
        query: Query,
    ) -> Self {
        Self {
            executor,
            logger,
            query,
            mapping: RawRows,
            placeholders: None,
            read_only: false,
        }
    }
}

impl<'a, M> PreparedQuery<'a, M> {
    /// Map rows through selected fields.
    pub fn with_fields(
        self,
        fields: Vec<SelectedField>,
        joins: Option<JoinNullability>,
    ) -> PreparedQuery<'a, FieldMapping> {
        self.with_mapping(FieldMapping::new(fields, joins))
    }

    /// Map the full row set through a custom mapper. Takes precedence over fields.
    pub fn with_mapper<F, T>(self, mapper: F) -> PreparedQuery<'a, CustomMapping<F, T>>
    where
        F: Fn(Vec<Row>) -> T + Send + Sync,
    {
        self.with_mapping(CustomMapping::new(mapper))
    }

    /// Replace the result mapping.
    pub fn with_mapping<N>(self, mapping: N) -> PreparedQuery<'a, N> {
        PreparedQuery {
            executor: self.executor,
            logger: self.logger,
            query: self.query,
            mapping,
            placeholders: self.placeholders,
            read_only: self.read_only,
        }
    }

    /// Values for the query's named placeholders, used on every dispatch.
    pub fn with_placeholders(mut self, placeholders: Placeholders) -> Self {
        self.placeholders = Some(placeholders);
        self
    }

    /// Forward a read-only hint to the capability.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn mapping(&self) -> &M {
        &self.mapping
    }

    /// Dispatch the statement with parameters that are already resolved.
    pub(crate) async fn dispatch_values(&self, params: &[Value]) -> ExecutionResult<ResultSet> {
        let sql = self.query.sql();
        self.logger.log_query(sql, params);

        let statement = Statement::new(sql, params);
        let results = self
            .executor
            .execute(std::slice::from_ref(&statement), self.read_only)
            .await?;

        results.into_iter().next().ok_or(ExecutionError::NoResultSet)
    }

    async fn dispatch(&self) -> SessionResult<ResultSet> {
        let params = self.query.resolve_params(self.placeholders.as_ref())?;
        Ok(self.dispatch_values(&params).await?)
    }
}

impl<'a, M: ResultMapping> PreparedQuery<'a, M> {
    /// Run for side effect; returns the capability's result set unmapped.
    pub async fn execute(&self) -> SessionResult<ResultSet> {
        self.dispatch().await
    }

    /// Every row, mapped.
    pub async fn fetch_all(&self) -> SessionResult<M::All> {
        let rows = self.dispatch().await?.into_rows();
        Ok(self.mapping.map_all(rows)?)
    }

    /// The first row (or, with a custom mapper, the mapped full row set).
    /// No rows is `None`, not an error.
    pub async fn fetch_one(&self) -> SessionResult<M::One> {
        let rows = self.dispatch().await?.into_rows();
        Ok(self.mapping.map_one(rows)?)
    }

    /// Rows as unmapped positional tuples.
    pub async fn fetch_raw(&self) -> SessionResult<Vec<Row>> {
        Ok(self.dispatch().await?.into_rows())
    }
}

impl<'a, M: fmt::Debug> fmt::Debug for PreparedQuery<'a, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedQuery")
            .field("query", &self.query)
            .field("mapping", &self.mapping)
            .field("read_only", &self.read_only)
            .finish()
    }
}
