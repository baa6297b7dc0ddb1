//! # tabload
//!
//! Streams tab-separated key/value records into a row table store:
//! - Mutation buffer with bulk flushes
//! - Partial failures logged, never fatal
//! - TCP client for a remote table store
//! - In-memory table store and emulator server
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 stdin  (<key>\t<value> lines)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Ingest Loop                               │
//! │              (parse, add, flush policy)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Mutation Buffer                             │
//! │            (row keys ∥ mutations, capacity)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ apply_bulk
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ RemoteTable │──TCP────▶│   Server    │
//!   │  (Client)   │          │ (emulator)  │
//!   └─────────────┘          └──────┬──────┘
//!          MemoryTable ─────────────┤
//!                                   ▼
//!                           ┌─────────────┐
//!                           │ TableStore  │
//!                           │  (RwLock)   │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod mutation;
pub mod buffer;
pub mod ingest;
pub mod store;
pub mod table;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, TabloadError};
pub use config::{Config, FlushPolicy, ServerConfig};
pub use buffer::{FlushReport, MutationBuffer};
pub use ingest::{ingest, IngestSummary};
pub use mutation::{Mutation, RowError};
pub use store::TableStore;
pub use table::{MemoryTable, RemoteTable, Table};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tabload
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
