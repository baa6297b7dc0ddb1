//! Ingest Module
//!
//! Streams input lines into a [`MutationBuffer`] and flushes it to a table.
//!
//! ## Flow
//! ```text
//! line ──parse──▶ buffer.add ──(policy says flush)──▶ buffer.flush ──▶ table
//!                                          end of input ──▶ final flush
//! ```
//!
//! A malformed line stops ingestion with an error. Rows buffered but not yet
//! flushed at that point are dropped; earlier flushes stay applied.

mod record;

pub use record::{parse_record, Record};

use std::io::{self, BufRead};

use bytes::Bytes;

use crate::buffer::{FlushReport, MutationBuffer};
use crate::config::{Config, FlushPolicy};
use crate::error::Result;
use crate::table::Table;

/// Totals for one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Valid records read
    pub records: usize,

    /// Rows submitted across all flushes
    pub rows_written: usize,

    /// Bulk requests made
    pub flushes: usize,

    /// Rows the store reported as failed
    pub row_errors: usize,

    /// Bulk requests that failed as a whole
    pub failed_requests: usize,

    /// Set if reading input stopped on an I/O error
    pub read_error: Option<String>,
}

impl IngestSummary {
    fn record_flush(&mut self, report: FlushReport) {
        if report.rows == 0 {
            return;
        }
        self.flushes += 1;
        self.rows_written += report.rows;
        self.row_errors += report.errors.len();
        if report.request_error.is_some() {
            self.failed_requests += 1;
        }
    }
}

/// Build the buffer described by `config`
pub fn buffer_for(config: &Config) -> MutationBuffer {
    MutationBuffer::new(&*config.family, &*config.column, config.batch_capacity)
}

/// Read `reader` to the end, writing every record to `table`
///
/// Lines may end in `\n` or `\r\n`, and one trailing `\r` is dropped even on
/// an unterminated last line. A read error (including invalid UTF-8) ends the
/// input early but still runs the final flush.
pub fn ingest<R, T>(
    reader: R,
    buffer: &mut MutationBuffer,
    table: &mut T,
    policy: FlushPolicy,
) -> Result<IngestSummary>
where
    R: BufRead,
    T: Table + ?Sized,
{
    let mut summary = IngestSummary::default();

    for (index, line) in reader.split(b'\n').enumerate() {
        let line = match line.and_then(decode_line) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("reading standard input: {}", e);
                summary.read_error = Some(e.to_string());
                break;
            }
        };

        let record = parse_record(&line, index + 1)?;
        buffer.add(record.key, Bytes::copy_from_slice(record.value.as_bytes()));
        summary.records += 1;

        let due = match policy {
            FlushPolicy::AtCapacity => buffer.remaining() == 0,
            FlushPolicy::EveryRecord => true,
        };
        if due {
            summary.record_flush(buffer.flush(table));
        }
    }

    summary.record_flush(buffer.flush(table));

    tracing::debug!(
        "Ingested {} records in {} flushes ({} row errors, {} failed requests)",
        summary.records,
        summary.flushes,
        summary.row_errors,
        summary.failed_requests
    );

    Ok(summary)
}

/// Drop one trailing `\r` and check the line is UTF-8
fn decode_line(mut bytes: Vec<u8>) -> io::Result<String> {
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
