//! Table Store
//!
//! In-memory row store backing the emulator and [`MemoryTable`].
//!
//! ## Layout
//! ```text
//! tables: name → Table
//!   families: {cf1, cf2, ...}
//!   rows:     row_key → (family, column) → [versions, newest first]
//! ```
//!
//! Each cell keeps at most `max_versions` versions; older ones are dropped
//! as new writes arrive.
//!
//! ## Concurrency
//! - All tables live behind one `RwLock`
//! - `mutate_rows` takes the write lock for the whole batch, so a bulk request
//!   is applied atomically with respect to readers
//! - All methods use `&self`
//!
//! [`MemoryTable`]: crate::table::MemoryTable

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::{Result, TabloadError};
use crate::mutation::{Cell, Mutation, Row, RowError, RowMutations, Timestamp};

type ColumnKey = (String, String);

/// Versions of one cell, newest first
type Versions = Vec<(i64, Bytes)>;

/// Versions kept per cell unless configured otherwise
pub const DEFAULT_MAX_VERSIONS: usize = 3;

#[derive(Debug, Default)]
struct Table {
    families: BTreeSet<String>,
    rows: BTreeMap<String, BTreeMap<ColumnKey, Versions>>,
}

impl Table {
    /// Check a row's mutations without applying them
    fn check(&self, entry: &RowMutations) -> std::result::Result<(), String> {
        if entry.row_key.is_empty() {
            return Err("row key must not be empty".to_string());
        }

        for mutation in &entry.mutations {
            if let Mutation::SetCell { family, .. } = mutation {
                if !self.families.contains(family) {
                    return Err(format!("column family '{}' not found", family));
                }
            }
        }

        Ok(())
    }

    fn apply(&mut self, entry: &RowMutations, now_micros: i64, max_versions: usize) {
        for mutation in &entry.mutations {
            match mutation {
                Mutation::SetCell {
                    family,
                    column,
                    timestamp,
                    value,
                } => {
                    let ts = match timestamp {
                        Timestamp::ServerTime => now_micros,
                        Timestamp::Micros(ts) => *ts,
                    };

                    let versions = self
                        .rows
                        .entry(entry.row_key.clone())
                        .or_default()
                        .entry((family.clone(), column.clone()))
                        .or_default();

                    // A write at an existing timestamp replaces that version
                    match versions.binary_search_by(|(existing, _)| ts.cmp(existing)) {
                        Ok(pos) => versions[pos].1 = value.clone(),
                        Err(pos) => versions.insert(pos, (ts, value.clone())),
                    }
                    versions.truncate(max_versions);
                }
                Mutation::DeleteRow => {
                    self.rows.remove(&entry.row_key);
                }
            }
        }
    }
}

/// Thread-safe collection of tables
#[derive(Debug)]
pub struct TableStore {
    tables: RwLock<HashMap<String, Table>>,
    max_versions: usize,
}

impl Default for TableStore {
    fn default() -> Self {
        Self::with_max_versions(DEFAULT_MAX_VERSIONS)
    }
}

impl TableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store keeping up to `max_versions` per cell (at least one)
    pub fn with_max_versions(max_versions: usize) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            max_versions: max_versions.max(1),
        }
    }

    pub fn max_versions(&self) -> usize {
        self.max_versions
    }

    /// Create a table with the given column families
    pub fn create_table<I, S>(&self, name: &str, families: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(TabloadError::TableExists(name.to_string()));
        }

        let table = Table {
            families: families.into_iter().map(Into::into).collect(),
            rows: BTreeMap::new(),
        };
        tables.insert(name.to_string(), table);

        tracing::debug!("Created table {}", name);
        Ok(())
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    /// Table names, sorted
    pub fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Apply a bulk request
    ///
    /// Each row is validated before any of its mutations are applied, so a
    /// failed row leaves no partial writes. Returns the failed rows; a missing
    /// table fails the whole request.
    pub fn mutate_rows(&self, table: &str, entries: &[RowMutations]) -> Result<Vec<RowError>> {
        let mut tables = self.tables.write();
        let data = tables
            .get_mut(table)
            .ok_or_else(|| TabloadError::TableNotFound(table.to_string()))?;

        let now = now_micros();
        let mut errors = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            match data.check(entry) {
                Ok(()) => data.apply(entry, now, self.max_versions),
                Err(message) => errors.push(RowError {
                    index,
                    row_key: entry.row_key.clone(),
                    message,
                }),
            }
        }

        Ok(errors)
    }

    /// Read a row back
    ///
    /// Returns `Ok(None)` if the row does not exist.
    pub fn read_row(&self, table: &str, row_key: &str) -> Result<Option<Row>> {
        let tables = self.tables.read();
        let data = tables
            .get(table)
            .ok_or_else(|| TabloadError::TableNotFound(table.to_string()))?;

        let Some(columns) = data.rows.get(row_key) else {
            return Ok(None);
        };

        let cells = columns
            .iter()
            .flat_map(|((family, column), versions)| {
                versions.iter().map(move |(ts, value)| Cell {
                    family: family.clone(),
                    column: column.clone(),
                    timestamp_micros: *ts,
                    value: value.clone(),
                })
            })
            .collect();

        Ok(Some(Row {
            key: row_key.to_string(),
            cells,
        }))
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let tables = self.tables.read();
        tables
            .get(table)
            .map(|t| t.rows.len())
            .ok_or_else(|| TabloadError::TableNotFound(table.to_string()))
    }
}

fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}
