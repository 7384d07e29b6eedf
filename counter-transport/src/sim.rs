//! In-memory CAN bus
//!
//! `SimCanBus` stands in for the hardware bus. The robot side uses it through
//! [`BusTransport`]; tests and simulated peripherals use the inherent methods
//! to inject incoming packets and inspect what was written.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::TransportError;
use crate::protocol::api;
use crate::types::{CanData, CanDeviceInfo};
use crate::BusTransport;

/// Buffered incoming packet
struct Incoming {
    packet: CanData,
    /// Not yet returned by `read_packet_new`
    fresh: bool,
}

#[derive(Default)]
struct SimBusState {
    incoming: HashMap<u16, Incoming>,
    last_written: HashMap<u16, CanData>,
    history: Vec<(u16, CanData)>,
    clock_ms: u64,
}

/// In-memory bus keyed by API id
pub struct SimCanBus {
    info: CanDeviceInfo,
    state: Mutex<SimBusState>,
}

impl SimCanBus {
    pub fn new(info: CanDeviceInfo) -> Self {
        Self {
            info,
            state: Mutex::new(SimBusState::default()),
        }
    }

    /// Buffer a packet as if the device had sent it
    pub fn create_bus_packet(
        &self,
        api_id: u16,
        data: &[u8],
        timestamp_ms: u64,
    ) -> Result<(), TransportError> {
        let packet = CanData::new(data, timestamp_ms)
            .ok_or(TransportError::PayloadTooLong { len: data.len() })?;
        trace!(
            "sim rx {} (0x{:03X}): {:02X?}",
            api::name(api_id),
            api_id,
            data
        );
        self.state.lock().incoming.insert(
            api_id,
            Incoming {
                packet,
                fresh: true,
            },
        );
        Ok(())
    }

    /// Most recent packet written for an API id
    pub fn last_written(&self, api_id: u16) -> Option<CanData> {
        self.state.lock().last_written.get(&api_id).copied()
    }

    /// All written packets in order
    pub fn written(&self) -> Vec<(u16, CanData)> {
        self.state.lock().history.clone()
    }

    /// Drain the write history
    pub fn take_written(&self) -> Vec<(u16, CanData)> {
        std::mem::take(&mut self.state.lock().history)
    }

    /// Advance the bus clock used to timestamp writes
    pub fn advance(&self, ms: u64) {
        let mut state = self.state.lock();
        state.clock_ms = state.clock_ms.saturating_add(ms);
    }

    pub fn now_ms(&self) -> u64 {
        self.state.lock().clock_ms
    }
}

impl Default for SimCanBus {
    fn default() -> Self {
        Self::new(CanDeviceInfo::default())
    }
}

impl BusTransport for SimCanBus {
    fn write_packet(&self, api_id: u16, data: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        let packet = CanData::new(data, state.clock_ms)
            .ok_or(TransportError::PayloadTooLong { len: data.len() })?;
        debug!(
            "sim tx {} (frame 0x{:08X}): {:02X?}",
            api::name(api_id),
            self.info.frame_id(api_id),
            data
        );
        state.last_written.insert(api_id, packet);
        state.history.push((api_id, packet));
        Ok(())
    }

    fn read_packet_latest(&self, api_id: u16) -> Result<Option<CanData>, TransportError> {
        let mut state = self.state.lock();
        Ok(state.incoming.get_mut(&api_id).map(|entry| {
            entry.fresh = false;
            entry.packet
        }))
    }

    fn read_packet_new(&self, api_id: u16) -> Result<Option<CanData>, TransportError> {
        let mut state = self.state.lock();
        match state.incoming.get_mut(&api_id) {
            Some(entry) if entry.fresh => {
                entry.fresh = false;
                Ok(Some(entry.packet))
            }
            _ => Ok(None),
        }
    }

    fn device_info(&self) -> &CanDeviceInfo {
        &self.info
    }
}
