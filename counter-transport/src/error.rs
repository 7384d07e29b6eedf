//! Bus error types

use thiserror::Error;

use crate::command::ParseError;

/// Errors that can occur during bus operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Payload too long: {len} bytes (max 8)")]
    PayloadTooLong { len: usize },

    #[error("Parse error: {0}")]
    Malformed(#[from] ParseError),
}
