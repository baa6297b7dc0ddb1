//! Input records
//!
//! One record per line: `<key>\t<value>`.

use crate::error::{Result, TabloadError};

/// A key/value pair borrowed from an input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// Parse one input line (without its line terminator)
///
/// The line must hold exactly one tab and a non-empty key. `line_number` is
/// 1-based and only used for error reporting.
pub fn parse_record(line: &str, line_number: usize) -> Result<Record<'_>> {
    let mut fields = line.split('\t');

    let (key, value) = match (fields.next(), fields.next(), fields.next()) {
        (Some(key), Some(value), None) => (key, value),
        _ => {
            return Err(TabloadError::InvalidLine {
                line_number,
                line: line.to_string(),
            })
        }
    };

    if key.is_empty() {
        return Err(TabloadError::InvalidRowKey {
            line_number,
            key: key.to_string(),
        });
    }

    Ok(Record { key, value })
}
