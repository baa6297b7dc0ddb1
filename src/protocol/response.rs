//! Response definitions
//!
//! Represents responses to clients.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TabloadError};
use crate::mutation::RowError;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
}

/// Body of an OK reply to MUTATE_ROWS
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutateRowsResponse {
    /// Rows that failed; empty when every row was applied
    pub errors: Vec<RowError>,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (bincode body for OK, message for ERROR/NOT_FOUND)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create an OK response carrying a bincode-encoded body
    pub fn ok_body<T: Serialize>(body: &T) -> Result<Self> {
        Ok(Self::ok(Some(bincode::serialize(body)?)))
    }

    /// Create a NOT_FOUND response
    pub fn not_found(message: &str) -> Self {
        Self {
            status: Status::NotFound,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Payload interpreted as a UTF-8 message
    pub fn message(&self) -> String {
        self.payload
            .as_deref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default()
    }

    /// Decode the bincode body of an OK response
    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T> {
        match self.status {
            Status::Ok => {
                let payload = self.payload.as_deref().unwrap_or(&[]);
                Ok(bincode::deserialize(payload)?)
            }
            Status::NotFound => Err(TabloadError::TableNotFound(self.message())),
            Status::Error => Err(TabloadError::Remote(self.message())),
        }
    }
}
