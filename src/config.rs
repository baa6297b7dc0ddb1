//! Configuration for tabload
//!
//! Centralized configuration with sensible defaults. [`Config`] drives the
//! loader, [`ServerConfig`] drives the emulator.

use crate::error::{Result, TabloadError};

/// Number of row mutations held before a flush is due
pub const DEFAULT_BATCH_CAPACITY: usize = 10_000;

/// Default emulator endpoint (host:port)
pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:8086";

/// When the ingestion loop flushes the mutation buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushPolicy {
    /// Flush once the buffer has no remaining capacity, and at end of input
    #[default]
    AtCapacity,

    /// Flush after every record (one bulk request per line)
    EveryRecord,
}

/// Loader configuration
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Target Table
    // -------------------------------------------------------------------------
    /// Project identifier
    pub project: String,

    /// Instance identifier
    pub instance: String,

    /// Table name
    pub table: String,

    /// Column family every cell is written to
    pub family: String,

    /// Column qualifier every cell is written to
    pub column: String,

    // -------------------------------------------------------------------------
    // Batching
    // -------------------------------------------------------------------------
    /// Maximum pending mutations before a flush is due
    pub batch_capacity: usize,

    pub flush_policy: FlushPolicy,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Table store endpoint (host:port)
    pub endpoint: String,

    /// Connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Socket read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: String::new(),
            instance: String::new(),
            table: String::new(),
            family: String::new(),
            column: String::new(),
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            flush_policy: FlushPolicy::AtCapacity,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout_ms: 10_000,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that every required field is present
    ///
    /// Fields are checked in the order they appear on the command line, so
    /// the first missing one is reported.
    pub fn validate(&self) -> Result<()> {
        let required: [(&str, &'static str); 5] = [
            (self.project.as_str(), "project"),
            (self.instance.as_str(), "instance"),
            (self.table.as_str(), "table"),
            (self.family.as_str(), "family"),
            (self.column.as_str(), "column"),
        ];

        for (value, name) in required {
            if value.is_empty() {
                return Err(TabloadError::MissingArgument(name));
            }
        }

        if self.batch_capacity == 0 {
            return Err(TabloadError::Config(
                "batch capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Fully qualified table path, the name the store knows the table by
    pub fn table_path(&self) -> String {
        table_path(&self.project, &self.instance, &self.table)
    }
}

/// `projects/<project>/instances/<instance>/tables/<table>`
pub fn table_path(project: &str, instance: &str, table: &str) -> String {
    format!("projects/{}/instances/{}/tables/{}", project, instance, table)
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.config.project = project.into();
        self
    }

    pub fn instance(mut self, instance: impl Into<String>) -> Self {
        self.config.instance = instance.into();
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.config.table = table.into();
        self
    }

    pub fn family(mut self, family: impl Into<String>) -> Self {
        self.config.family = family.into();
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.config.column = column.into();
        self
    }

    /// Set the number of mutations buffered before a flush
    pub fn batch_capacity(mut self, capacity: usize) -> Self {
        self.config.batch_capacity = capacity;
        self
    }

    pub fn flush_policy(mut self, policy: FlushPolicy) -> Self {
        self.config.flush_policy = policy;
        self
    }

    /// Set the table store endpoint (host:port)
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Emulator server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP listen address
    pub listen_addr: String,

    /// Worker threads serving connections
    pub workers: usize,

    /// Accepted connections allowed to wait for a free worker
    pub max_pending: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_ENDPOINT.to_string(),
            workers: 4,
            max_pending: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
        }
    }
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for ServerConfig
#[derive(Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of worker threads (at least one is always started)
    pub fn workers(mut self, count: usize) -> Self {
        self.config.workers = count;
        self
    }

    /// Set the size of the accepted-connection queue
    pub fn max_pending(mut self, count: usize) -> Self {
        self.config.max_pending = count;
        self
    }

    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}
