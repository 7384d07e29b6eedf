//! Simulated counting peripheral
//!
//! Plays the device side of a [`SimCanBus`]: applies the latest control
//! packet the robot wrote and answers with a count packet.

use std::sync::Arc;

use counter_transport::{
    api, decode_counter_command, encode_counter_count, SimCanBus, TransportError,
};
use tracing::{trace, warn};

pub struct SimCounter {
    bus: Arc<SimCanBus>,
    count: u16,
}

impl SimCounter {
    pub fn new(bus: Arc<SimCanBus>) -> Self {
        Self { bus, count: 0 }
    }

    /// Current count
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Run one device cycle and publish the resulting count
    ///
    /// While enabled the count advances by the commanded speed, wrapping at
    /// 16 bits. Pressing both buttons while enabled resets it to zero. A
    /// disabled or malformed command leaves the count unchanged.
    pub fn step(&mut self) -> Result<u16, TransportError> {
        if let Some(packet) = self.bus.last_written(api::COUNTER_CONTROL) {
            match decode_counter_command(packet.data()) {
                Ok(cmd) if cmd.enabled && cmd.button_a && cmd.button_b => {
                    trace!("sim counter reset");
                    self.count = 0;
                }
                Ok(cmd) if cmd.enabled => {
                    self.count = self.count.wrapping_add(u16::from(cmd.speed));
                }
                Ok(_) => {}
                Err(e) => warn!("sim counter ignoring control packet: {}", e),
            }
        }

        let now = self.bus.now_ms();
        self.bus
            .create_bus_packet(api::COUNTER_COUNT, &encode_counter_count(self.count), now)?;
        Ok(self.count)
    }
}
