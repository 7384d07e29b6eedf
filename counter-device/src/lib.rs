//! High-level interface for the CAN counting peripheral
//!
//! This crate provides a convenient API for controlling the counter and
//! reading its count on top of any bus backend.

pub mod error;

pub use error::DeviceError;

use counter_transport::{
    api, decode_counter_count, BoxedBus, BusTransportExt, CanDeviceInfo, CounterCommand,
    CounterCount,
};
use tracing::{debug, trace};

/// A count value together with the bus timestamp of its packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountReading {
    pub count: u16,
    pub timestamp_ms: u64,
}

impl CountReading {
    /// Hexadecimal rendering used on the display (e.g. `0x1a2b`)
    pub fn to_hex(&self) -> String {
        format!("{:#x}", self.count)
    }
}

/// High-level counter interface using any bus
pub struct CounterDevice {
    bus: BoxedBus,
}

impl CounterDevice {
    pub fn new(bus: BoxedBus) -> Self {
        Self { bus }
    }

    pub fn device_info(&self) -> &CanDeviceInfo {
        self.bus.device_info()
    }

    // === Control ===

    /// Send a control command
    pub fn send_command(&self, cmd: &CounterCommand) -> Result<(), DeviceError> {
        trace!("counter control: {:?}", cmd);
        self.bus.send(cmd)?;
        Ok(())
    }

    /// Enable counting with the given button state and speed
    pub fn enable(&self, button_a: bool, button_b: bool, speed: u8) -> Result<(), DeviceError> {
        self.send_command(&CounterCommand::new(true, button_a, button_b, speed))
    }

    /// Disable counting
    pub fn disable(&self) -> Result<(), DeviceError> {
        debug!("disabling counter");
        self.send_command(&CounterCommand::disable())
    }

    // === Count ===

    /// Latest count reported by the device, `None` if it never reported
    pub fn read_count(&self) -> Result<Option<u16>, DeviceError> {
        Ok(self.read_count_reading()?.map(|r| r.count))
    }

    /// Latest count with its bus timestamp
    pub fn read_count_reading(&self) -> Result<Option<CountReading>, DeviceError> {
        let packet = match self.bus.read_packet_latest(api::COUNTER_COUNT)? {
            Some(packet) => packet,
            None => return Ok(None),
        };
        let count = decode_counter_count(packet.data())?;
        Ok(Some(CountReading {
            count,
            timestamp_ms: packet.timestamp_ms,
        }))
    }

    /// Count from a packet not read before, `None` if nothing new arrived
    pub fn read_new_count(&self) -> Result<Option<u16>, DeviceError> {
        let count: Option<CounterCount> = self.bus.read_new()?;
        Ok(count.map(|c| c.count))
    }
}
