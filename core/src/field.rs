//! Selected field descriptors.
//!
//! A [`SelectedField`] describes where one output column lands in the mapped
//! record (its path), which table it was read from, and how its driver value
//! is decoded. [`JoinNullability`] records which joined tables may produce an
//! all-null group of columns when the join matched nothing.

use std::collections::HashMap;

use crate::error::{MapError, MapResult};
use crate::value::Value;

/// How a driver value is converted into an application value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldDecoder {
    /// Pass the value through unchanged.
    #[default]
    Identity,
    /// Integer 0/1 to Bool.
    Boolean,
    /// Integer seconds since epoch to Timestamp.
    TimestampSeconds,
    /// Integer milliseconds since epoch to Timestamp.
    TimestampMillis,
    /// Text or Blob holding JSON to Json.
    Json,
}

impl FieldDecoder {
    /// Name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldDecoder::Identity => "identity",
            FieldDecoder::Boolean => "boolean",
            FieldDecoder::TimestampSeconds => "timestamp",
            FieldDecoder::TimestampMillis => "timestamp_ms",
            FieldDecoder::Json => "json",
        }
    }

    /// Decode a non-null driver value.
    pub fn decode(&self, field: &str, value: Value) -> MapResult<Value> {
        match (self, value) {
            (FieldDecoder::Identity, v) => Ok(v),
            (_, Value::Null) => Ok(Value::Null),
            (FieldDecoder::Boolean, Value::Integer(i)) => Ok(Value::Bool(i != 0)),
            (FieldDecoder::Boolean, v @ Value::Bool(_)) => Ok(v),
            (FieldDecoder::TimestampSeconds, Value::Integer(s)) => {
                Ok(Value::Timestamp(s.saturating_mul(1000)))
            }
            (FieldDecoder::TimestampMillis, Value::Integer(ms)) => Ok(Value::Timestamp(ms)),
            (FieldDecoder::TimestampSeconds | FieldDecoder::TimestampMillis, v @ Value::Timestamp(_)) => {
                Ok(v)
            }
            (FieldDecoder::Json, Value::Text(s)) => serde_json::from_str(&s)
                .map(Value::Json)
                .map_err(|source| MapError::InvalidJson {
                    field: field.to_string(),
                    source,
                }),
            (FieldDecoder::Json, Value::Blob(b)) => serde_json::from_slice(&b)
                .map(Value::Json)
                .map_err(|source| MapError::InvalidJson {
                    field: field.to_string(),
                    source,
                }),
            (FieldDecoder::Json, v @ Value::Json(_)) => Ok(v),
            (decoder, v) => Err(MapError::Decode {
                field: field.to_string(),
                decoder: decoder.name(),
                found: v.type_name(),
            }),
        }
    }
}

/// Describes one output column of a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedField {
    /// Key path in the mapped record; nested keys build nested objects.
    pub path: Vec<String>,
    /// Source table, when the column comes from a table rather than an expression.
    pub table: Option<String>,
    /// Decoder applied to non-null values.
    pub decoder: FieldDecoder,
}

impl SelectedField {
    /// A top-level field not tied to any table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            path: vec![name.into()],
            table: None,
            decoder: FieldDecoder::Identity,
        }
    }

    /// A column of `table` placed at `path`.
    pub fn column<I, S>(table: impl Into<String>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            table: Some(table.into()),
            decoder: FieldDecoder::Identity,
        }
    }

    /// Set the decoder.
    pub fn decoder(mut self, decoder: FieldDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Dotted path, for diagnostics.
    pub fn display_path(&self) -> String {
        self.path.join(".")
    }
}

/// Which joined tables are guaranteed to match.
///
/// Tables absent from the map are treated as nullable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinNullability {
    not_nullable: HashMap<String, bool>,
}

impl JoinNullability {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a table as always matched (inner join or the base table).
    pub fn not_nullable(mut self, table: impl Into<String>) -> Self {
        self.not_nullable.insert(table.into(), true);
        self
    }

    /// Mark a table as possibly unmatched (left/right/full join).
    pub fn nullable(mut self, table: impl Into<String>) -> Self {
        self.not_nullable.insert(table.into(), false);
        self
    }

    /// Check if a table's column group may be replaced by null.
    pub fn is_nullable(&self, table: &str) -> bool {
        !self.not_nullable.get(table).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.not_nullable.is_empty()
    }
}
