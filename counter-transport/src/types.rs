//! Common types for the bus layer

use serde::Serialize;

use crate::protocol::{self, MAX_PAYLOAD};

/// A received or written CAN data frame payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanData {
    data: [u8; MAX_PAYLOAD],
    length: u8,
    /// Bus timestamp in milliseconds
    pub timestamp_ms: u64,
}

impl CanData {
    /// Create from payload bytes. Returns `None` if longer than 8 bytes.
    pub fn new(data: &[u8], timestamp_ms: u64) -> Option<Self> {
        if data.len() > MAX_PAYLOAD {
            return None;
        }
        let mut buf = [0u8; MAX_PAYLOAD];
        buf[..data.len()].copy_from_slice(data);
        Some(Self {
            data: buf,
            length: data.len() as u8,
            timestamp_ms,
        })
    }

    /// Payload bytes (0..8 bytes in length)
    pub fn data(&self) -> &[u8] {
        &self.data[..self.length as usize]
    }

    pub fn len(&self) -> usize {
        self.length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Identity of the CAN device this bus handle talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanDeviceInfo {
    /// Device number (0-63)
    pub device_number: u8,
    /// Manufacturer id
    pub manufacturer: u8,
    /// Device type
    pub device_type: u8,
}

impl CanDeviceInfo {
    /// Team-use miscellaneous device with the given device number
    pub fn team_use(device_number: u8) -> Self {
        Self {
            device_number,
            manufacturer: protocol::MANUFACTURER_TEAM_USE,
            device_type: protocol::DEVICE_TYPE_MISCELLANEOUS,
        }
    }

    /// Full 29-bit arbitration id for a message with the given API id
    pub fn frame_id(&self, api_id: u16) -> u32 {
        protocol::frame_id(
            self.device_type,
            self.manufacturer,
            api_id,
            self.device_number,
        )
    }
}

impl Default for CanDeviceInfo {
    fn default() -> Self {
        Self::team_use(protocol::DEFAULT_DEVICE_NUMBER)
    }
}
