//! In-process table
//!
//! Writes straight into a shared [`TableStore`], no network involved.

use std::sync::Arc;

use super::{pair_entries, Table};
use crate::error::Result;
use crate::mutation::{Mutation, RowError};
use crate::store::TableStore;

/// A handle to one table of a shared [`TableStore`]
#[derive(Debug, Clone)]
pub struct MemoryTable {
    store: Arc<TableStore>,
    name: String,
}

impl MemoryTable {
    /// Open `name` in `store`
    ///
    /// The table is not required to exist yet; writes to a missing table
    /// fail as a whole.
    pub fn new(store: Arc<TableStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }
}

impl Table for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply_bulk(&mut self, row_keys: &[String], mutations: &[Mutation]) -> Result<Vec<RowError>> {
        let entries = pair_entries(row_keys, mutations)?;
        self.store.mutate_rows(&self.name, &entries)
    }
}
