//! Command definitions
//!
//! Requests sent by clients to the table store.

use serde::{Deserialize, Serialize};

use crate::mutation::RowMutations;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Ping = 0x01,
    MutateRows = 0x02,
    ReadRow = 0x03,
    ListTables = 0x04,
}

/// Bulk write of many rows to one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutateRowsRequest {
    pub table: String,
    pub entries: Vec<RowMutations>,
}

/// Point read of one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRowRequest {
    pub table: String,
    pub row_key: String,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ping (health check, used as the connect handshake)
    Ping,

    /// Apply mutations to many rows
    MutateRows(MutateRowsRequest),

    /// Read a single row
    ReadRow(ReadRowRequest),

    /// List table names
    ListTables,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Ping => CommandType::Ping,
            Command::MutateRows(_) => CommandType::MutateRows,
            Command::ReadRow(_) => CommandType::ReadRow,
            Command::ListTables => CommandType::ListTables,
        }
    }
}
