//! Network Module
//!
//! TCP client and emulator server.
//!
//! ## Architecture
//! - Client: one blocking connection, one request in flight
//! - Server: single acceptor thread
//! - Worker thread pool for connections, fed by a bounded channel
//! - Commands executed against a shared TableStore

mod client;
mod server;
mod connection;

pub use client::Client;
pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
