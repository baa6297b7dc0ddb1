//! Table Module
//!
//! The backing store as seen by the mutation buffer.
//!
//! ## Implementations
//! - [`MemoryTable`]: applies directly to an in-process [`TableStore`]
//! - [`RemoteTable`]: sends MUTATE_ROWS over a [`Client`] connection
//!
//! [`TableStore`]: crate::store::TableStore
//! [`Client`]: crate::network::Client

mod memory;
mod remote;

pub use memory::MemoryTable;
pub use remote::RemoteTable;

use crate::error::{Result, TabloadError};
use crate::mutation::{Mutation, RowError, RowMutations};

/// A table that accepts bulk writes
pub trait Table {
    /// Table name
    fn name(&self) -> &str;

    /// Apply one mutation per row key, as a single request
    ///
    /// `row_keys` and `mutations` are index-aligned. `Ok` carries the rows
    /// that failed (empty on full success); `Err` means the request failed
    /// as a whole.
    fn apply_bulk(&mut self, row_keys: &[String], mutations: &[Mutation]) -> Result<Vec<RowError>>;
}

/// Pair keys with their mutations for a bulk request
pub(crate) fn pair_entries(row_keys: &[String], mutations: &[Mutation]) -> Result<Vec<RowMutations>> {
    if row_keys.len() != mutations.len() {
        return Err(TabloadError::BulkWrite(format!(
            "mismatched row keys and mutations: {} != {}",
            row_keys.len(),
            mutations.len()
        )));
    }

    Ok(row_keys
        .iter()
        .zip(mutations)
        .map(|(key, mutation)| RowMutations {
            row_key: key.clone(),
            mutations: vec![mutation.clone()],
        })
        .collect())
}
