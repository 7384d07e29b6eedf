//! PrinterBus middleware for monitoring bus traffic
//!
//! Wraps any `BusTransport` and prints every packet written or read through
//! it, decoded where the API id is known.
//!
//! # Example
//!
//! ```ignore
//! use counter_transport::{PrinterBus, PrinterConfig, SimCanBus};
//!
//! let bus = Arc::new(SimCanBus::default());
//! let monitored = PrinterBus::wrap(bus, PrinterConfig::default());
//! ```

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::command::{try_parse_packet, ParsedPacket};
use crate::error::TransportError;
use crate::protocol::api;
use crate::types::{CanData, CanDeviceInfo};
use crate::BusTransport;

/// Output format for the printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Packet filter for selective display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PacketFilter {
    #[default]
    All,
    Writes,
    Reads,
    Api(u16),
}

impl FromStr for PacketFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "writes" | "write" | "tx" => Ok(Self::Writes),
            "reads" | "read" | "rx" => Ok(Self::Reads),
            s if s.starts_with("api=") || s.starts_with("0x") => {
                let hex_str = s.strip_prefix("api=").unwrap_or(s);
                let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
                u16::from_str_radix(hex_str, 16)
                    .map(Self::Api)
                    .map_err(|e| format!("Invalid API id: {}", e))
            }
            _ => Err(format!("Unknown filter: {}", s)),
        }
    }
}

/// Configuration for the PrinterBus
#[derive(Debug, Clone, Default)]
pub struct PrinterConfig {
    /// Show raw hex dump alongside decoded output
    pub show_hex: bool,
    /// Filter for selective display
    pub filter: PacketFilter,
    /// Output format
    pub format: OutputFormat,
}

impl PrinterConfig {
    pub fn with_hex(mut self, show: bool) -> Self {
        self.show_hex = show;
        self
    }

    pub fn with_filter(mut self, filter: PacketFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

/// Traffic direction relative to the robot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Tx,
    Rx,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    direction: Direction,
    api_id: u16,
    name: &'static str,
    frame_id: u32,
    timestamp_ms: Option<u64>,
    packet: &'a ParsedPacket,
    #[serde(skip_serializing_if = "Option::is_none")]
    hex: Option<&'a [u8]>,
}

/// Bus middleware that prints all traffic
pub struct PrinterBus {
    inner: Arc<dyn BusTransport>,
    config: PrinterConfig,
}

impl PrinterBus {
    /// Wrap a bus with printing middleware
    pub fn wrap(bus: Arc<dyn BusTransport>, config: PrinterConfig) -> Arc<dyn BusTransport> {
        Arc::new(Self::new(bus, config))
    }

    pub fn new(bus: Arc<dyn BusTransport>, config: PrinterConfig) -> Self {
        Self { inner: bus, config }
    }

    fn should_show(&self, direction: Direction, api_id: u16) -> bool {
        match &self.config.filter {
            PacketFilter::All => true,
            PacketFilter::Writes => direction == Direction::Tx,
            PacketFilter::Reads => direction == Direction::Rx,
            PacketFilter::Api(id) => *id == api_id,
        }
    }

    /// Render one packet, or `None` if filtered out
    pub fn format_packet(
        &self,
        direction: Direction,
        api_id: u16,
        data: &[u8],
        timestamp_ms: Option<u64>,
    ) -> Option<String> {
        if !self.should_show(direction, api_id) {
            return None;
        }

        let parsed = try_parse_packet(api_id, data);
        let frame_id = self.inner.device_info().frame_id(api_id);

        match self.config.format {
            OutputFormat::Json => {
                let record = JsonRecord {
                    direction,
                    api_id,
                    name: api::name(api_id),
                    frame_id,
                    timestamp_ms,
                    packet: &parsed,
                    hex: self.config.show_hex.then_some(data),
                };
                serde_json::to_string(&record).ok()
            }
            OutputFormat::Text => {
                let arrow = match direction {
                    Direction::Tx => ">>> TX",
                    Direction::Rx => "<<< RX",
                };
                let mut line = format!(
                    "{}  0x{:03x} {} [0x{:08x}]  {:?}",
                    arrow,
                    api_id,
                    api::name(api_id),
                    frame_id,
                    parsed
                );
                if self.config.show_hex {
                    line.push_str(&format!("\n    HEX  {:02x?}", data));
                }
                Some(line)
            }
        }
    }

    fn print_packet(
        &self,
        direction: Direction,
        api_id: u16,
        data: &[u8],
        timestamp_ms: Option<u64>,
    ) {
        if let Some(line) = self.format_packet(direction, api_id, data, timestamp_ms) {
            eprintln!("{}", line);
        }
    }

    fn print_read(&self, api_id: u16, packet: &Option<CanData>) {
        if let Some(p) = packet {
            self.print_packet(Direction::Rx, api_id, p.data(), Some(p.timestamp_ms));
        }
    }
}

impl BusTransport for PrinterBus {
    fn write_packet(&self, api_id: u16, data: &[u8]) -> Result<(), TransportError> {
        self.print_packet(Direction::Tx, api_id, data, None);
        self.inner.write_packet(api_id, data)
    }

    fn read_packet_latest(&self, api_id: u16) -> Result<Option<CanData>, TransportError> {
        let packet = self.inner.read_packet_latest(api_id)?;
        self.print_read(api_id, &packet);
        Ok(packet)
    }

    fn read_packet_new(&self, api_id: u16) -> Result<Option<CanData>, TransportError> {
        let packet = self.inner.read_packet_new(api_id)?;
        self.print_read(api_id, &packet);
        Ok(packet)
    }

    fn device_info(&self) -> &CanDeviceInfo {
        self.inner.device_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimCanBus;

    fn printer(config: PrinterConfig) -> PrinterBus {
        PrinterBus::new(Arc::new(SimCanBus::default()), config)
    }

    #[test]
    fn test_packet_filter_parse() {
        assert_eq!(PacketFilter::from_str("all").unwrap(), PacketFilter::All);
        assert_eq!(PacketFilter::from_str("tx").unwrap(), PacketFilter::Writes);
        assert_eq!(PacketFilter::from_str("reads").unwrap(), PacketFilter::Reads);
        assert_eq!(
            PacketFilter::from_str("api=0x2").unwrap(),
            PacketFilter::Api(2)
        );
        assert_eq!(
            PacketFilter::from_str("0x01F").unwrap(),
            PacketFilter::Api(0x1F)
        );
        assert!(PacketFilter::from_str("bogus").is_err());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert!(OutputFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_format_text_write() {
        let p = printer(PrinterConfig::default());
        let line = p
            .format_packet(Direction::Tx, api::COUNTER_CONTROL, &[128, 7], None)
            .unwrap();
        assert!(line.starts_with(">>> TX"));
        assert!(line.contains("COUNTER_CONTROL"));
        assert!(line.contains("0x0a080040"));
        assert!(line.contains("speed: 128"));
        assert!(!line.contains("HEX"));
    }

    #[test]
    fn test_format_hex_dump() {
        let p = printer(PrinterConfig::default().with_hex(true));
        let line = p
            .format_packet(Direction::Rx, api::COUNTER_COUNT, &[0x34, 0x12], Some(3))
            .unwrap();
        assert!(line.contains("HEX  [34, 12]"));
    }

    #[test]
    fn test_format_json_read() {
        let p = printer(PrinterConfig::default().with_format(OutputFormat::Json));
        let line = p
            .format_packet(Direction::Rx, api::COUNTER_COUNT, &[0x34, 0x12], Some(3))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["direction"], "rx");
        assert_eq!(value["name"], "COUNTER_COUNT");
        assert_eq!(value["packet"]["count"], 0x1234);
        assert_eq!(value["timestamp_ms"], 3);
        assert!(value.get("hex").is_none());
    }

    #[test]
    fn test_filter_hides_packets() {
        let p = printer(PrinterConfig::default().with_filter(PacketFilter::Reads));
        assert!(p
            .format_packet(Direction::Tx, api::COUNTER_CONTROL, &[0, 0], None)
            .is_none());

        let p = printer(PrinterConfig::default().with_filter(PacketFilter::Api(2)));
        assert!(p
            .format_packet(Direction::Tx, api::COUNTER_CONTROL, &[0, 0], None)
            .is_none());
        assert!(p
            .format_packet(Direction::Rx, api::COUNTER_COUNT, &[0, 0], None)
            .is_some());
    }

    #[test]
    fn test_wrapped_bus_passes_through() {
        let sim = Arc::new(SimCanBus::default());
        let bus = PrinterBus::wrap(sim.clone(), PrinterConfig::default());
        bus.write_packet(api::COUNTER_CONTROL, &[5, 4]).unwrap();
        assert_eq!(
            sim.last_written(api::COUNTER_CONTROL).unwrap().data(),
            &[5, 4]
        );

        sim.create_bus_packet(api::COUNTER_COUNT, &[9, 0], 0).unwrap();
        let packet = bus.read_packet_latest(api::COUNTER_COUNT).unwrap().unwrap();
        assert_eq!(packet.data(), &[9, 0]);
    }
}
