//! Table Store Client
//!
//! Blocking client used by the loader to reach a remote table store.

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{Result, TabloadError};
use crate::mutation::Row;
use crate::protocol::{read_response, write_command, Command, ReadRowRequest, Response};
use crate::table::RemoteTable;

/// Connection to a table store
pub struct Client {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Address actually connected to
    peer_addr: SocketAddr,
}

impl Client {
    /// Connect to `config.endpoint` and perform the PING handshake
    pub fn connect(config: &Config) -> Result<Self> {
        let stream = open_stream(&config.endpoint, config.connect_timeout_ms)?;

        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        Self::from_stream(stream)
    }

    /// Connect to `addr` with default timeouts
    pub fn connect_addr(addr: impl Into<String>) -> Result<Self> {
        let config = Config::builder().endpoint(addr).build();
        Self::connect(&config)
    }

    fn from_stream(stream: TcpStream) -> Result<Self> {
        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let peer_addr = stream.peer_addr()?;
        let read_stream = stream.try_clone()?;

        let mut client = Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            peer_addr,
        };

        client.ping()?;
        tracing::debug!("Connected to table store at {}", client.peer_addr);
        Ok(client)
    }

    /// Open a table handle
    ///
    /// No round trip is made; a missing table surfaces on the first write.
    pub fn open_table(&mut self, name: impl Into<String>) -> RemoteTable<'_> {
        RemoteTable::new(self, name.into())
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        let response = self.call(&Command::Ping)?;
        match response.payload.as_deref() {
            Some(b"PONG") => Ok(()),
            _ => Err(TabloadError::Protocol(format!(
                "unexpected PING reply: {:?} '{}'",
                response.status,
                response.message()
            ))),
        }
    }

    /// Read one row back from a table
    pub fn read_row(&mut self, table: &str, row_key: &str) -> Result<Option<Row>> {
        let request = ReadRowRequest {
            table: table.to_string(),
            row_key: row_key.to_string(),
        };
        self.call(&Command::ReadRow(request))?.decode_body()
    }

    /// Names of all tables on the server
    pub fn list_tables(&mut self) -> Result<Vec<String>> {
        self.call(&Command::ListTables)?.decode_body()
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Send one command and wait for its response
    pub(crate) fn call(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }
}

/// Resolve `endpoint` and connect to the first address that answers
fn open_stream(endpoint: &str, timeout_ms: u64) -> Result<TcpStream> {
    let addrs = endpoint
        .to_socket_addrs()
        .map_err(|e| TabloadError::Network(format!("cannot resolve {}: {}", endpoint, e)))?;

    let mut last_err = None;
    for addr in addrs {
        let attempt = if timeout_ms > 0 {
            TcpStream::connect_timeout(&addr, Duration::from_millis(timeout_ms))
        } else {
            TcpStream::connect(addr)
        };

        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(TabloadError::Network(match last_err {
        Some(e) => format!("cannot connect to {}: {}", endpoint, e),
        None => format!("{} resolved to no addresses", endpoint),
    }))
}
