//! Protocol Module
//!
//! Defines the wire protocol between the loader and the table store.
//!
//! ## Protocol Format (V1 - Framed Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: PING         - Payload: empty
//! - 0x02: MUTATE_ROWS  - Payload: bincode `MutateRowsRequest`
//! - 0x03: READ_ROW     - Payload: bincode `ReadRowRequest`
//! - 0x04: LIST_TABLES  - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND
//! - 0x02: ERROR (payload is a UTF-8 message)

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType, MutateRowsRequest, ReadRowRequest};
pub use response::{MutateRowsResponse, Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
