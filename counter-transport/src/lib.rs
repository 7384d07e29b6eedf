//! Bus abstraction layer for the CAN counting peripheral
//!
//! This crate provides the packet codecs of the counting peripheral and a
//! unified interface for writing and reading CAN packets by API id:
//!
//! - `SimCanBus` (in-memory bus for tests and the demo harness)
//! - `PrinterBus` (middleware that prints all traffic)
//!
//! Real hardware buses implement [`BusTransport`] outside this crate.

pub mod command;
pub mod error;
pub mod printer;
pub mod protocol;
pub mod sim;
pub mod types;

pub use command::{
    decode_counter_command, decode_counter_count, encode_counter_command, encode_counter_count,
    pack_flags, try_parse_packet, BusTransportExt, CanCommand, CanResponse, CounterCommand,
    CounterCommandData, CounterCount, CounterCountData, ParseError, ParsedPacket,
};
pub use error::TransportError;
pub use printer::{Direction, OutputFormat, PacketFilter, PrinterBus, PrinterConfig};
pub use protocol::{api, api_id};
pub use sim::SimCanBus;
pub use types::{CanData, CanDeviceInfo};

use std::sync::Arc;

/// The core bus trait - all backends implement this
///
/// Packets are addressed by API id. Incoming packets are buffered per API id
/// by the backend; reads select from that buffer and never block.
pub trait BusTransport: Send + Sync {
    /// Write a packet tagged with an API id
    ///
    /// # Arguments
    /// * `api_id` - API id (see [`protocol::api_id`])
    /// * `data` - Payload, at most 8 bytes
    fn write_packet(&self, api_id: u16, data: &[u8]) -> Result<(), TransportError>;

    /// Read the most recent packet received for an API id
    ///
    /// Keeps returning the same packet until a newer one arrives.
    /// Returns `None` if nothing has been received for this API id.
    fn read_packet_latest(&self, api_id: u16) -> Result<Option<CanData>, TransportError>;

    /// Read a packet only if it has not been returned by a previous read
    fn read_packet_new(&self, api_id: u16) -> Result<Option<CanData>, TransportError>;

    /// Get device identity
    fn device_info(&self) -> &CanDeviceInfo;
}

/// Type alias for a shared bus
pub type BoxedBus = Arc<dyn BusTransport>;
