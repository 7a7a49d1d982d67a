//! Queries: SQL text plus an ordered parameter list.
//!
//! A [`Query`] is produced by an external builder and consumed read-only.
//! Parameters are either concrete values or named placeholders that are
//! filled from a [`Placeholders`] map at dispatch time.

use std::collections::HashMap;

use crate::error::{MapError, MapResult};
use crate::value::Value;

/// Values for named placeholders, keyed by placeholder name.
pub type Placeholders = HashMap<String, Value>;

/// A single positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// A concrete bound value.
    Value(Value),
    /// A named placeholder resolved at dispatch time.
    Placeholder(String),
}

impl Param {
    /// Create a placeholder parameter.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Param::Placeholder(name.into())
    }

    /// Resolve this parameter against the supplied placeholder values.
    pub fn resolve(&self, placeholders: Option<&Placeholders>) -> MapResult<Value> {
        match self {
            Param::Value(v) => Ok(v.clone()),
            Param::Placeholder(name) => placeholders
                .and_then(|p| p.get(name))
                .cloned()
                .ok_or_else(|| MapError::missing_placeholder(name)),
        }
    }
}

impl From<Value> for Param {
    fn from(v: Value) -> Self {
        Param::Value(v)
    }
}

macro_rules! param_from {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Param {
                fn from(v: $ty) -> Self {
                    Param::Value(Value::from(v))
                }
            }
        )+
    };
}

param_from!(bool, i32, i64, f64, String, &str, Vec<u8>);

/// SQL text and its ordered parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    sql: String,
    params: Vec<Param>,
}

impl Query {
    /// Create a query without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Create a query with the given parameters.
    pub fn with_params<I, P>(sql: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        Self {
            sql: sql.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a bound value.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(Param::Value(value.into()));
        self
    }

    /// Append a named placeholder.
    pub fn placeholder(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::placeholder(name));
        self
    }

    /// The SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The parameters as declared.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Check if any parameter is a named placeholder.
    pub fn has_placeholders(&self) -> bool {
        self.params
            .iter()
            .any(|p| matches!(p, Param::Placeholder(_)))
    }

    /// Produce the full positional parameter list for one dispatch.
    pub fn resolve_params(&self, placeholders: Option<&Placeholders>) -> MapResult<Vec<Value>> {
        self.params.iter().map(|p| p.resolve(placeholders)).collect()
    }
}
