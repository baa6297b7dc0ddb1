//! Mutation Buffer
//!
//! Accumulates single-cell row writes and submits them as one bulk request.
//!
//! ## Layout
//! ```text
//! row_keys:  [ k0 , k1 , k2 , ... ]
//! mutations: [ m0 , m1 , m2 , ... ]   (mi is the write for ki)
//! ```
//! Both vectors always have the same length. The buffer never flushes on
//! its own; callers check [`MutationBuffer::remaining`] and call
//! [`MutationBuffer::flush`].

use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::mutation::{Mutation, RowError};
use crate::table::Table;

/// Outcome of one flush
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Rows submitted (not rows that succeeded)
    pub rows: usize,

    /// Wall time spent in the bulk request
    pub elapsed: Duration,

    /// Rows the store rejected
    pub errors: Vec<RowError>,

    /// Set when the request failed as a whole
    pub request_error: Option<String>,
}

impl FlushReport {
    /// True if any row or the whole request failed
    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty() || self.request_error.is_some()
    }
}

/// Pending writes for one family:column
#[derive(Debug)]
pub struct MutationBuffer {
    family: String,
    column: String,
    row_keys: Vec<String>,
    mutations: Vec<Mutation>,
    capacity: usize,
}

impl MutationBuffer {
    /// Create an empty buffer writing to `family:column`
    ///
    /// `capacity` is the flush threshold; it is fixed for the buffer's life.
    pub fn new(family: impl Into<String>, column: impl Into<String>, capacity: usize) -> Self {
        Self {
            family: family.into(),
            column: column.into(),
            row_keys: Vec::with_capacity(capacity),
            mutations: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Queue a server-timestamped write of `value` to `key`
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Bytes>) {
        let mutation = Mutation::set_cell(self.family.as_str(), self.column.as_str(), value);
        self.row_keys.push(key.into());
        self.mutations.push(mutation);
    }

    /// Slots left before the buffer reaches capacity
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.len())
    }

    /// Drop every pending write
    pub fn clear(&mut self) {
        self.row_keys.clear();
        self.mutations.clear();
    }

    /// Submit all pending writes as one bulk request
    ///
    /// An empty buffer makes no request. Otherwise the buffer is cleared
    /// whatever the outcome; row failures and request failures are logged and
    /// returned in the report, never raised.
    pub fn flush<T: Table + ?Sized>(&mut self, table: &mut T) -> FlushReport {
        let rows = self.len();
        if rows == 0 {
            return FlushReport::default();
        }

        let started = Instant::now();
        let outcome = table.apply_bulk(&self.row_keys, &self.mutations);
        let elapsed = started.elapsed();

        let mut report = FlushReport {
            rows,
            elapsed,
            ..FlushReport::default()
        };

        match outcome {
            Ok(errors) if errors.is_empty() => {}
            Ok(errors) => {
                tracing::warn!("{} errors: {}", errors.len(), errors[0]);
                for error in errors.iter().skip(1) {
                    tracing::debug!("bulk write to {}: {}", table.name(), error);
                }
                report.errors = errors;
            }
            Err(e) => {
                tracing::warn!("bulk write to {} failed: {}", table.name(), e);
                report.request_error = Some(e.to_string());
            }
        }

        self.clear();
        tracing::info!("wrote {} rows in {} ms", rows, elapsed.as_millis());

        report
    }

    /// Pending writes
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.row_keys.len(), self.mutations.len());
        self.row_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn row_keys(&self) -> &[String] {
        &self.row_keys
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }
}
