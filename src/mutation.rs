//! Row mutations and the row/cell model
//!
//! Shared by the loader, the table store, and the wire protocol.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Cell timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timestamp {
    /// Assigned by the store when the mutation is applied
    ServerTime,

    /// Explicit microseconds since the Unix epoch
    Micros(i64),
}

/// A single write operation on a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    /// Set one cell
    SetCell {
        family: String,
        column: String,
        timestamp: Timestamp,
        value: Bytes,
    },

    /// Remove every cell of the row
    DeleteRow,
}

impl Mutation {
    /// Set `family:column` to `value`, timestamped by the server
    pub fn set_cell(
        family: impl Into<String>,
        column: impl Into<String>,
        value: impl Into<Bytes>,
    ) -> Self {
        Mutation::SetCell {
            family: family.into(),
            column: column.into(),
            timestamp: Timestamp::ServerTime,
            value: value.into(),
        }
    }
}

/// All mutations for one row in a bulk request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMutations {
    pub row_key: String,
    pub mutations: Vec<Mutation>,
}

/// One failed row of a bulk write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Position of the row in the submitted batch
    pub index: usize,
    pub row_key: String,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {} ('{}'): {}", self.index, self.row_key, self.message)
    }
}

/// A stored cell version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub family: String,
    pub column: String,
    pub timestamp_micros: i64,
    pub value: Bytes,
}

/// A row as read back from the store
///
/// Cells are grouped by family and column; versions of one column are
/// ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub key: String,
    pub cells: Vec<Cell>,
}

impl Row {
    /// Newest version of `family:column`, if any
    pub fn latest(&self, family: &str, column: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|c| c.family == family && c.column == column)
    }
}
