//! Type-safe CAN command builders and response parsers
//!
//! Wire layouts of the counting peripheral live here, together with the
//! traits the bus extension uses to send commands and read responses.

use serde::Serialize;
use thiserror::Error;
use zerocopy::byteorder::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::TransportError;
use crate::protocol::api;
use crate::BusTransport;

// =============================================================================
// Core Traits
// =============================================================================

/// A command that can be written to the bus
pub trait CanCommand {
    /// API id the command is tagged with
    const API_ID: u16;

    /// Fixed wire representation
    type Wire: IntoBytes + Immutable;

    /// Serialize to the wire struct
    fn to_wire(&self) -> Self::Wire;
}

/// A response that can be parsed from a received payload
pub trait CanResponse: Sized {
    /// API id the response is read from
    const API_ID: u16;

    /// Minimum payload length required
    const MIN_LEN: usize;

    /// Parse from payload bytes (length already validated)
    fn from_data(data: &[u8]) -> Result<Self, ParseError>;

    /// Parse with length validation
    fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < Self::MIN_LEN {
            return Err(ParseError::MalformedPacket {
                expected: Self::MIN_LEN,
                got: data.len(),
            });
        }
        Self::from_data(data)
    }
}

/// Parse error for received payloads
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed packet: expected at least {expected} bytes, got {got}")]
    MalformedPacket { expected: usize, got: usize },

    #[error("Invalid value for {field}: 0x{value:02X}")]
    InvalidValue { field: &'static str, value: u8 },
}

/// Typed send/read helpers for any bus
pub trait BusTransportExt: BusTransport {
    /// Write a typed command
    fn send<C: CanCommand>(&self, cmd: &C) -> Result<(), TransportError> {
        self.write_packet(C::API_ID, cmd.to_wire().as_bytes())
    }

    /// Parse the latest buffered packet for a response type
    fn read_latest<R: CanResponse>(&self) -> Result<Option<R>, TransportError> {
        match self.read_packet_latest(R::API_ID)? {
            Some(packet) => Ok(Some(R::parse(packet.data())?)),
            None => Ok(None),
        }
    }

    /// Parse a packet that has not been read before
    fn read_new<R: CanResponse>(&self) -> Result<Option<R>, TransportError> {
        match self.read_packet_new(R::API_ID)? {
            Some(packet) => Ok(Some(R::parse(packet.data())?)),
            None => Ok(None),
        }
    }
}

impl<T: BusTransport + ?Sized> BusTransportExt for T {}

// =============================================================================
// Flag packing
// =============================================================================

/// Pack booleans into a byte, first flag most significant.
///
/// Each flag shifts the accumulator left by one and sets the new low bit.
/// Only the last 8 flags survive.
#[inline]
pub fn pack_flags(flags: &[bool]) -> u8 {
    flags
        .iter()
        .fold(0u8, |acc, &flag| (acc << 1) | u8::from(flag))
}

/// Flag bits of the counter control packet
pub mod flag {
    pub const BUTTON_A: u8 = 1 << 0;
    pub const BUTTON_B: u8 = 1 << 1;
    pub const ENABLED: u8 = 1 << 2;
    /// Bits that are always zero on the wire
    pub const RESERVED: u8 = !(ENABLED | BUTTON_B | BUTTON_A);
}

// =============================================================================
// Counter control (robot -> device)
// =============================================================================

/// Wire layout of the counter control packet: `[speed][flags]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct CounterCommandData {
    pub speed: u8,
    pub flags: u8,
}

/// Counter control command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CounterCommand {
    pub enabled: bool,
    pub button_a: bool,
    pub button_b: bool,
    pub speed: u8,
}

impl CounterCommand {
    pub const fn new(enabled: bool, button_a: bool, button_b: bool, speed: u8) -> Self {
        Self {
            enabled,
            button_a,
            button_b,
            speed,
        }
    }

    /// The packet sent when leaving autonomous: counter disabled, both
    /// buttons set, speed 1.
    pub const fn disable() -> Self {
        Self::new(false, true, true, 1)
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn button_a(mut self, pressed: bool) -> Self {
        self.button_a = pressed;
        self
    }

    pub fn button_b(mut self, pressed: bool) -> Self {
        self.button_b = pressed;
        self
    }

    pub fn speed(mut self, speed: u8) -> Self {
        self.speed = speed;
        self
    }

    /// Flag byte. Packing order is enabled, button B, button A, so button A
    /// lands in bit 0 even though it comes first in the argument list.
    pub fn flags(&self) -> u8 {
        pack_flags(&[self.enabled, self.button_b, self.button_a])
    }
}

impl CanCommand for CounterCommand {
    const API_ID: u16 = api::COUNTER_CONTROL;
    type Wire = CounterCommandData;

    fn to_wire(&self) -> CounterCommandData {
        CounterCommandData {
            speed: self.speed,
            flags: self.flags(),
        }
    }
}

/// Encode a counter control packet.
pub fn encode_counter_command(enabled: bool, button_a: bool, button_b: bool, speed: u8) -> [u8; 2] {
    let wire = CounterCommand::new(enabled, button_a, button_b, speed).to_wire();
    [wire.speed, wire.flags]
}

/// Decode a counter control packet, as the peripheral sees it.
///
/// Rejects packets with reserved flag bits set.
pub fn decode_counter_command(data: &[u8]) -> Result<CounterCommand, ParseError> {
    let (wire, _) =
        CounterCommandData::read_from_prefix(data).map_err(|_| ParseError::MalformedPacket {
            expected: std::mem::size_of::<CounterCommandData>(),
            got: data.len(),
        })?;
    if wire.flags & flag::RESERVED != 0 {
        return Err(ParseError::InvalidValue {
            field: "flags",
            value: wire.flags,
        });
    }
    Ok(CounterCommand {
        enabled: wire.flags & flag::ENABLED != 0,
        button_a: wire.flags & flag::BUTTON_A != 0,
        button_b: wire.flags & flag::BUTTON_B != 0,
        speed: wire.speed,
    })
}

// =============================================================================
// Counter count (device -> robot)
// =============================================================================

/// Wire layout of the count packet: little-endian u16
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct CounterCountData {
    pub count: U16,
}

impl CounterCountData {
    pub fn new(count: u16) -> Self {
        Self {
            count: U16::new(count),
        }
    }
}

/// Count value reported by the peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CounterCount {
    pub count: u16,
}

impl CanResponse for CounterCount {
    const API_ID: u16 = api::COUNTER_COUNT;
    const MIN_LEN: usize = std::mem::size_of::<CounterCountData>();

    fn from_data(data: &[u8]) -> Result<Self, ParseError> {
        // Extra bytes after the count are ignored
        let (wire, _) =
            CounterCountData::read_from_prefix(data).map_err(|_| ParseError::MalformedPacket {
                expected: Self::MIN_LEN,
                got: data.len(),
            })?;
        Ok(Self {
            count: wire.count.get(),
        })
    }
}

/// Decode the count from a received payload.
///
/// Reads the first two bytes as a little-endian u16. Fails with
/// [`ParseError::MalformedPacket`] on fewer than two bytes.
pub fn decode_counter_count(payload: &[u8]) -> Result<u16, ParseError> {
    CounterCount::parse(payload).map(|c| c.count)
}

/// Encode a count packet, as the peripheral sends it.
pub fn encode_counter_count(count: u16) -> [u8; 2] {
    let wire = CounterCountData::new(count);
    let mut buf = [0u8; 2];
    buf.copy_from_slice(wire.as_bytes());
    buf
}

// =============================================================================
// Packet dispatch (monitoring)
// =============================================================================

/// A packet decoded by API id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ParsedPacket {
    CounterControl(CounterCommand),
    CounterCount { count: u16 },
    Malformed { api_id: u16, error: String },
    /// Long enough to decode but carrying a value the device never sends
    Invalid { api_id: u16, error: String },
    Unknown { api_id: u16, data: Vec<u8> },
}

/// Decode any packet of the counting peripheral
pub fn try_parse_packet(api_id: u16, data: &[u8]) -> ParsedPacket {
    let result = match api_id {
        api::COUNTER_CONTROL => decode_counter_command(data).map(ParsedPacket::CounterControl),
        api::COUNTER_COUNT => {
            decode_counter_count(data).map(|count| ParsedPacket::CounterCount { count })
        }
        _ => {
            return ParsedPacket::Unknown {
                api_id,
                data: data.to_vec(),
            }
        }
    };
    result.unwrap_or_else(|e| match e {
        ParseError::MalformedPacket { .. } => ParsedPacket::Malformed {
            api_id,
            error: e.to_string(),
        },
        ParseError::InvalidValue { .. } => ParsedPacket::Invalid {
            api_id,
            error: e.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_flags_order() {
        assert_eq!(pack_flags(&[]), 0);
        assert_eq!(pack_flags(&[true]), 0b1);
        assert_eq!(pack_flags(&[true, false, false]), 0b100);
        assert_eq!(pack_flags(&[false, true, true]), 0b011);
        // Only the last 8 flags fit
        let mut nine = [false; 9];
        nine[0] = true;
        assert_eq!(pack_flags(&nine), 0);
    }

    #[test]
    fn test_encode_all_enabled() {
        assert_eq!(encode_counter_command(true, true, true, 128), [128, 0b0000_0111]);
    }

    #[test]
    fn test_encode_disabled_both_buttons() {
        assert_eq!(encode_counter_command(false, true, true, 255), [255, 0b0000_0011]);
    }

    #[test]
    fn test_encode_bit_assignment() {
        assert_eq!(encode_counter_command(true, false, false, 0)[1], flag::ENABLED);
        assert_eq!(encode_counter_command(false, true, false, 0)[1], flag::BUTTON_A);
        assert_eq!(encode_counter_command(false, false, true, 0)[1], flag::BUTTON_B);
    }

    #[test]
    fn test_encode_reserved_bits_always_clear() {
        for bits in 0..8u8 {
            let (enabled, a, b) = (bits & 4 != 0, bits & 1 != 0, bits & 2 != 0);
            for speed in 0..=u8::MAX {
                let packet = encode_counter_command(enabled, a, b, speed);
                assert_eq!(packet.len(), 2);
                assert_eq!(packet[0], speed);
                assert_eq!(packet[1] & flag::RESERVED, 0);
                assert_eq!(packet[1], bits);
            }
        }
    }

    #[test]
    fn test_disable_packet() {
        let wire = CounterCommand::disable().to_wire();
        assert_eq!(wire.as_bytes(), &[1, 0b011]);
    }

    #[test]
    fn test_builder_matches_encoder() {
        let cmd = CounterCommand::default()
            .enabled(true)
            .button_b(true)
            .speed(42);
        assert_eq!(cmd.to_wire().as_bytes(), &encode_counter_command(true, false, true, 42));
    }

    #[test]
    fn test_command_data_size_and_layout() {
        assert_eq!(std::mem::size_of::<CounterCommandData>(), 2);
        let pkt = CounterCommandData {
            speed: 0x80,
            flags: 0x05,
        };
        assert_eq!(pkt.as_bytes(), &[0x80, 0x05]);
    }

    #[test]
    fn test_decode_command() {
        let cmd = decode_counter_command(&[200, 0b101]).unwrap();
        assert_eq!(cmd, CounterCommand::new(true, true, false, 200));
    }

    #[test]
    fn test_decode_command_rejects_reserved_bits() {
        assert_eq!(
            decode_counter_command(&[0, 0x08]),
            Err(ParseError::InvalidValue {
                field: "flags",
                value: 0x08
            })
        );
    }

    #[test]
    fn test_decode_command_too_short() {
        assert_eq!(
            decode_counter_command(&[7]),
            Err(ParseError::MalformedPacket {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_count_data_size() {
        assert_eq!(std::mem::size_of::<CounterCountData>(), 2);
        assert_eq!(CounterCountData::new(0x1234).as_bytes(), &[0x34, 0x12]);
    }

    #[test]
    fn test_decode_count() {
        assert_eq!(decode_counter_count(&[0x34, 0x12]), Ok(0x1234));
    }

    #[test]
    fn test_decode_count_ignores_extra_bytes() {
        assert_eq!(decode_counter_count(&[0x34, 0x12, 0xFF]), Ok(0x1234));
    }

    #[test]
    fn test_decode_count_too_short() {
        assert_eq!(
            decode_counter_count(&[0x01]),
            Err(ParseError::MalformedPacket {
                expected: 2,
                got: 1
            })
        );
        assert!(matches!(
            decode_counter_count(&[]),
            Err(ParseError::MalformedPacket { got: 0, .. })
        ));
    }

    #[test]
    fn test_count_roundtrip_full_range() {
        for count in 0..=u16::MAX {
            assert_eq!(decode_counter_count(&encode_counter_count(count)), Ok(count));
            assert_eq!(decode_counter_count(&count.to_le_bytes()), Ok(count));
        }
    }

    #[test]
    fn test_try_parse_packet() {
        assert_eq!(
            try_parse_packet(api::COUNTER_COUNT, &[0xFF, 0x00]),
            ParsedPacket::CounterCount { count: 0xFF }
        );
        assert_eq!(
            try_parse_packet(api::COUNTER_CONTROL, &[10, 0b100]),
            ParsedPacket::CounterControl(CounterCommand::new(true, false, false, 10))
        );
        assert!(matches!(
            try_parse_packet(api::COUNTER_COUNT, &[0xFF]),
            ParsedPacket::Malformed { api_id: 2, .. }
        ));
        assert!(matches!(
            try_parse_packet(api::COUNTER_CONTROL, &[0]),
            ParsedPacket::Malformed { api_id: 1, .. }
        ));
        assert!(matches!(
            try_parse_packet(api::COUNTER_CONTROL, &[0, 0x08]),
            ParsedPacket::Invalid { api_id: 1, .. }
        ));
        assert_eq!(
            try_parse_packet(0x30, &[1, 2, 3]),
            ParsedPacket::Unknown {
                api_id: 0x30,
                data: vec![1, 2, 3]
            }
        );
    }

    #[test]
    fn test_parsed_packet_json() {
        let json = serde_json::to_string(&ParsedPacket::CounterCount { count: 7 }).unwrap();
        assert_eq!(json, r#"{"kind":"CounterCount","count":7}"#);
    }
}
