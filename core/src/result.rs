//! Result sets returned by an execution capability.

use crate::value::{Row, Value};

/// The engine's answer to one statement: rows plus write metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column names, in row order.
    pub columns: Vec<String>,
    /// Data rows.
    pub rows: Vec<Row>,
    /// Number of rows changed by a write.
    pub rows_affected: u64,
    /// Rowid of the last inserted row, when the engine reports one.
    pub last_insert_id: Option<i64>,
}

impl ResultSet {
    /// Create a result set with rows.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            rows_affected: 0,
            last_insert_id: None,
        }
    }

    /// Create an empty result set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create the result of a write.
    pub fn affected(rows_affected: u64, last_insert_id: Option<i64>) -> Self {
        Self {
            rows_affected,
            last_insert_id,
            ..Default::default()
        }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of a named column in the given row.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Take the rows, dropping the metadata.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}
