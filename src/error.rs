//! Error types for tabload
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TabloadError
pub type Result<T> = std::result::Result<T, TabloadError>;

/// Unified error type for tabload operations
#[derive(Debug, Error)]
pub enum TabloadError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("invalid input line: '{line}'")]
    InvalidLine { line_number: usize, line: String },

    #[error("invalid row key: '{key}'")]
    InvalidRowKey { line_number: usize, key: String },

    // -------------------------------------------------------------------------
    // Table Store Errors
    // -------------------------------------------------------------------------
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table already exists: {0}")]
    TableExists(String),

    #[error("Bulk write rejected: {0}")]
    BulkWrite(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server error: {0}")]
    Remote(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Missing required argument: -{0}")]
    MissingArgument(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for TabloadError {
    fn from(err: bincode::Error) -> Self {
        TabloadError::Serialization(err.to_string())
    }
}
