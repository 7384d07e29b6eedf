//! Counter device error types

use counter_transport::{ParseError, TransportError};
use thiserror::Error;

/// Errors from counter device operations
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Bus layer error
    #[error("Transport error: {0}")]
    Transport(TransportError),

    /// Count packet could not be decoded
    #[error("Malformed response: {0}")]
    Malformed(#[from] ParseError),
}

impl From<TransportError> for DeviceError {
    fn from(e: TransportError) -> Self {
        // Decode failures surface as Malformed
        match e {
            TransportError::Malformed(parse) => DeviceError::Malformed(parse),
            other => DeviceError::Transport(other),
        }
    }
}

impl DeviceError {
    /// True when the device answered with a packet too short to decode
    pub fn is_malformed_packet(&self) -> bool {
        matches!(
            self,
            DeviceError::Malformed(ParseError::MalformedPacket { .. })
        )
    }
}
