//! Remote table
//!
//! A bulk write travels as one MUTATE_ROWS frame, or as several when the
//! encoded rows would not fit in a single frame.

use std::ops::Range;

use super::{pair_entries, Table};
use crate::error::{Result, TabloadError};
use crate::mutation::{Mutation, RowError, RowMutations};
use crate::network::Client;
use crate::protocol::{Command, MutateRowsRequest, MutateRowsResponse, MAX_PAYLOAD_SIZE};

/// A table reached through a [`Client`] connection
///
/// Created by [`Client::open_table`]; borrows the client for its lifetime.
pub struct RemoteTable<'c> {
    client: &'c mut Client,
    name: String,
    max_request_bytes: u64,
}

impl<'c> RemoteTable<'c> {
    pub(crate) fn new(client: &'c mut Client, name: String) -> Self {
        Self {
            client,
            name,
            max_request_bytes: u64::from(MAX_PAYLOAD_SIZE),
        }
    }

    /// Cap the encoded size of one MUTATE_ROWS request
    ///
    /// Larger bulk writes are split across several requests. Values above the
    /// protocol's frame limit are clamped to it.
    pub fn with_max_request_bytes(mut self, bytes: u64) -> Self {
        self.max_request_bytes = bytes.min(u64::from(MAX_PAYLOAD_SIZE));
        self
    }

    fn send(&mut self, entries: Vec<RowMutations>) -> Result<Vec<RowError>> {
        let request = MutateRowsRequest {
            table: self.name.clone(),
            entries,
        };

        let response = self.client.call(&Command::MutateRows(request))?;
        let body: MutateRowsResponse = response.decode_body()?;
        Ok(body.errors)
    }
}

impl Table for RemoteTable<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    /// Send the rows, splitting them when one frame cannot hold them all
    ///
    /// Row error indexes refer to the whole batch. If a later request fails as
    /// a whole, rows sent by earlier requests stay applied.
    fn apply_bulk(&mut self, row_keys: &[String], mutations: &[Mutation]) -> Result<Vec<RowError>> {
        let entries = pair_entries(row_keys, mutations)?;
        let chunks = split_by_size(&self.name, &entries, self.max_request_bytes)?;

        if chunks.len() == 1 {
            return self.send(entries);
        }

        tracing::debug!(
            "Splitting {} rows for {} into {} requests",
            entries.len(),
            self.name,
            chunks.len()
        );

        let mut errors = Vec::new();
        let mut rows = entries.into_iter();
        for range in chunks {
            let chunk: Vec<RowMutations> = rows.by_ref().take(range.len()).collect();
            for mut error in self.send(chunk)? {
                error.index += range.start;
                errors.push(error);
            }
        }

        Ok(errors)
    }
}

/// Group `entries` into consecutive ranges whose requests fit `max_bytes`
///
/// A single row too large for any request is an error.
fn split_by_size(table: &str, entries: &[RowMutations], max_bytes: u64) -> Result<Vec<Range<usize>>> {
    let empty = MutateRowsRequest {
        table: table.to_string(),
        entries: Vec::new(),
    };
    let base = bincode::serialized_size(&empty)?;

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut size = base;

    for (index, entry) in entries.iter().enumerate() {
        let entry_size = bincode::serialized_size(entry)?;
        if base + entry_size > max_bytes {
            return Err(TabloadError::BulkWrite(format!(
                "row '{}' needs {} bytes, over the {} byte request limit",
                entry.row_key,
                base + entry_size,
                max_bytes
            )));
        }

        if size + entry_size > max_bytes {
            chunks.push(start..index);
            start = index;
            size = base;
        }
        size += entry_size;
    }

    chunks.push(start..entries.len());
    Ok(chunks)
}
