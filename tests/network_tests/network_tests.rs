//! Tests for the client and emulator server
//!
//! These tests verify:
//! - Handshake, listing, and reads over TCP
//! - Bulk writes through RemoteTable
//! - Batches over the request size limit are split across requests
//! - Whole-request failures surface as flush request errors
//! - Server shutdown, including with idle clients connected

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::Bytes;
use tabload::mutation::Mutation;
use tabload::network::{Client, Server, ShutdownHandle};
use tabload::{ingest, Config, FlushPolicy, MutationBuffer, ServerConfig, Table, TableStore, TabloadError};

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    addr: SocketAddr,
    shutdown: ShutdownHandle,
    join: Option<JoinHandle<()>>,
}

impl TestServer {
    fn start(store: Arc<TableStore>) -> Self {
        let config = ServerConfig::builder()
            .listen_addr("127.0.0.1:0")
            .workers(2)
            .build();
        let server = Server::bind(config, store).unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle().unwrap();
        let join = thread::spawn(move || server.run().unwrap());

        Self {
            addr,
            shutdown,
            join: Some(join),
        }
    }

    fn client(&self) -> Client {
        Client::connect_addr(self.addr.to_string()).unwrap()
    }

    /// Shut down and wait up to `limit` for `run` to return
    fn stop_within(&mut self, limit: Duration) -> bool {
        self.shutdown.shutdown();
        let join = self.join.take().unwrap();

        let (tx, rx) = crossbeam::channel::bounded(1);
        thread::spawn(move || {
            let _ = tx.send(join.join().is_ok());
        });

        rx.recv_timeout(limit) == Ok(true)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.shutdown();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn store_with_table() -> Arc<TableStore> {
    let store = Arc::new(TableStore::new());
    store.create_table("events", ["cf"]).unwrap();
    store
}

// =============================================================================
// Connection Tests
// =============================================================================

#[test]
fn test_connect_and_ping() {
    let server = TestServer::start(store_with_table());
    let mut client = server.client();

    client.ping().unwrap();
    assert_eq!(client.peer_addr(), server.addr);
}

#[test]
fn test_connect_with_configured_timeouts() {
    let server = TestServer::start(store_with_table());
    let config = Config::builder()
        .endpoint(server.addr.to_string())
        .connect_timeout_ms(500)
        .read_timeout_ms(2000)
        .write_timeout_ms(2000)
        .build();

    let mut client = Client::connect(&config).unwrap();
    assert_eq!(client.list_tables().unwrap(), vec!["events"]);
}

#[test]
fn test_connect_refused() {
    // Bind then drop to get a port nobody listens on
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let result = Client::connect_addr(addr.to_string());
    assert!(matches!(result, Err(TabloadError::Network(_))));
}

#[test]
fn test_list_tables() {
    let store = store_with_table();
    store.create_table("audit", ["cf"]).unwrap();
    let server = TestServer::start(store);

    let mut client = server.client();
    assert_eq!(client.list_tables().unwrap(), vec!["audit", "events"]);
}

// =============================================================================
// Bulk Write Tests
// =============================================================================

#[test]
fn test_remote_bulk_write_and_read_back() {
    let store = store_with_table();
    let server = TestServer::start(Arc::clone(&store));
    let mut client = server.client();

    {
        let mut table = client.open_table("events");
        assert_eq!(table.name(), "events");

        let mut buffer = MutationBuffer::new("cf", "payload", 10);
        buffer.add("e1", "login");
        buffer.add("e2", "logout");

        let report = buffer.flush(&mut table);
        assert_eq!(report.rows, 2);
        assert!(!report.has_failures());
    }

    let row = client.read_row("events", "e2").unwrap().unwrap();
    assert_eq!(row.latest("cf", "payload").unwrap().value, Bytes::from("logout"));
    assert!(client.read_row("events", "e3").unwrap().is_none());
    assert_eq!(store.row_count("events").unwrap(), 2);
}

#[test]
fn test_remote_row_errors_are_returned() {
    let server = TestServer::start(store_with_table());
    let mut client = server.client();
    let mut table = client.open_table("events");

    let mut buffer = MutationBuffer::new("wrong", "col", 10);
    buffer.add("a", "1");

    let report = buffer.flush(&mut table);
    assert_eq!(report.rows, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row_key, "a");
    assert!(report.errors[0].message.contains("wrong"));
}

#[test]
fn test_remote_missing_table_is_request_error() {
    let server = TestServer::start(store_with_table());
    let mut client = server.client();

    {
        let mut table = client.open_table("nope");
        let mut buffer = MutationBuffer::new("cf", "col", 10);
        buffer.add("a", "1");

        let report = buffer.flush(&mut table);
        assert_eq!(report.rows, 1);
        assert_eq!(report.request_error.as_deref(), Some("table not found: nope"));
        assert!(buffer.is_empty());
    }

    // The connection stays usable after a failed request
    client.ping().unwrap();
    assert!(matches!(
        client.read_row("nope", "a"),
        Err(TabloadError::TableNotFound(_))
    ));
}

#[test]
fn test_remote_ingest_with_intermediate_flushes() {
    let store = store_with_table();
    let server = TestServer::start(Arc::clone(&store));
    let mut client = server.client();
    let mut table = client.open_table("events");

    let input: String = (0..7).map(|i| format!("k{}\tv{}\n", i, i)).collect();
    let mut buffer = MutationBuffer::new("cf", "col", 3);

    let summary = ingest(Cursor::new(input), &mut buffer, &mut table, FlushPolicy::AtCapacity).unwrap();

    assert_eq!(summary.rows_written, 7);
    assert_eq!(summary.flushes, 3);
    assert_eq!(store.row_count("events").unwrap(), 7);
}

#[test]
fn test_batch_over_request_limit_is_split() {
    let store = store_with_table();
    let server = TestServer::start(Arc::clone(&store));
    let mut client = server.client();
    let mut table = client.open_table("events").with_max_request_bytes(4096);

    let value = vec![b'v'; 512];
    let mut buffer = MutationBuffer::new("cf", "col", 200);
    for i in 0..200 {
        buffer.add(format!("k{:03}", i), value.clone());
    }

    let report = buffer.flush(&mut table);
    assert_eq!(report.rows, 200);
    assert!(!report.has_failures(), "{:?}", report);
    assert_eq!(store.row_count("events").unwrap(), 200);

    let row = store.read_row("events", "k199").unwrap().unwrap();
    assert_eq!(row.latest("cf", "col").unwrap().value, Bytes::from(value));
}

#[test]
fn test_split_batch_reports_row_errors_by_batch_position() {
    let server = TestServer::start(store_with_table());
    let mut client = server.client();
    let mut table = client.open_table("events").with_max_request_bytes(1024);

    let keys: Vec<String> = (0..40).map(|i| format!("k{:02}", i)).collect();
    let mutations: Vec<Mutation> = (0..40)
        .map(|i| {
            let family = if i % 10 == 9 { "missing" } else { "cf" };
            Mutation::set_cell(family, "col", vec![b'v'; 64])
        })
        .collect();

    let errors = table.apply_bulk(&keys, &mutations).unwrap();
    let failed: Vec<(usize, &str)> = errors.iter().map(|e| (e.index, e.row_key.as_str())).collect();

    assert_eq!(failed, vec![(9, "k09"), (19, "k19"), (29, "k29"), (39, "k39")]);
}

#[test]
fn test_row_over_request_limit_is_request_error() {
    let store = store_with_table();
    let server = TestServer::start(Arc::clone(&store));
    let mut client = server.client();
    let mut table = client.open_table("events").with_max_request_bytes(256);

    let mut buffer = MutationBuffer::new("cf", "col", 10);
    buffer.add("big", vec![b'v'; 1024]);

    let report = buffer.flush(&mut table);
    assert_eq!(report.rows, 1);
    assert!(report.request_error.is_some());
    assert_eq!(store.row_count("events").unwrap(), 0);

    // Nothing was sent, so the connection is still in step
    client.ping().unwrap();
}

#[test]
fn test_concurrent_clients() {
    let store = store_with_table();
    let server = TestServer::start(Arc::clone(&store));
    let addr = server.addr.to_string();

    let handles: Vec<_> = (0..4)
        .map(|c| {
            let addr = addr.clone();
            thread::spawn(move || {
                let mut client = Client::connect_addr(addr).unwrap();
                let mut table = client.open_table("events");
                let mut buffer = MutationBuffer::new("cf", "col", 50);
                for i in 0..100 {
                    buffer.add(format!("c{}-{}", c, i), "v");
                    if buffer.remaining() == 0 {
                        assert!(!buffer.flush(&mut table).has_failures());
                    }
                }
                buffer.flush(&mut table);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.row_count("events").unwrap(), 400);
}

// =============================================================================
// Shutdown Tests
// =============================================================================

#[test]
fn test_shutdown_stops_server() {
    let mut server = TestServer::start(store_with_table());
    {
        let mut client = server.client();
        client.ping().unwrap();
    }

    server.shutdown.shutdown();
    server.join.take().unwrap().join().unwrap();

    // The listener is gone once run() returns
    assert!(Client::connect_addr(server.addr.to_string()).is_err());
}

#[test]
fn test_shutdown_with_idle_client_connected() {
    let mut server = TestServer::start(store_with_table());
    let mut idle = server.client();
    idle.ping().unwrap();

    assert!(server.stop_within(Duration::from_secs(5)));

    // The server closed the idle connection on its way out
    assert!(idle.ping().is_err());
}

#[test]
fn test_shutdown_with_every_worker_busy() {
    let mut server = TestServer::start(store_with_table());
    let mut clients: Vec<Client> = (0..2).map(|_| server.client()).collect();
    for client in &mut clients {
        client.ping().unwrap();
    }

    assert!(server.stop_within(Duration::from_secs(5)));
}
