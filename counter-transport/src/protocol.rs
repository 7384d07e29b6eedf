//! Protocol constants and addressing for the counting peripheral
//!
//! Messages are addressed by an API id built from a coarse API class and a
//! 4-bit API index. The full 29-bit CAN arbitration id additionally carries
//! the device type, manufacturer and device number.

/// Maximum data bytes in a single CAN frame
pub const MAX_PAYLOAD: usize = 8;

/// Manufacturer id reserved for team use
pub const MANUFACTURER_TEAM_USE: u8 = 8;

/// Device type for miscellaneous devices
pub const DEVICE_TYPE_MISCELLANEOUS: u8 = 10;

/// Device number used when none is configured
pub const DEFAULT_DEVICE_NUMBER: u8 = 0;

/// Build an API id from an API class and API index.
///
/// Computes `(class << 4) + index`. The index must be below 16; larger values
/// carry into the class bits and address a different class. This is not
/// checked.
#[inline]
pub const fn api_id(class: u16, index: u16) -> u16 {
    (class << 4).wrapping_add(index)
}

/// API classes and indices of the counting peripheral
pub mod api {
    use super::api_id;

    /// Counting device
    pub const CLASS_COUNTER: u16 = 0;
    /// Counting device control
    pub const INDEX_COUNTER_CONTROL: u16 = 1;
    /// Counting device count value
    pub const INDEX_COUNTER_COUNT: u16 = 2;

    /// Robot -> device control packets
    pub const COUNTER_CONTROL: u16 = api_id(CLASS_COUNTER, INDEX_COUNTER_CONTROL);
    /// Device -> robot count packets
    pub const COUNTER_COUNT: u16 = api_id(CLASS_COUNTER, INDEX_COUNTER_COUNT);

    /// Get human-readable name for an API id
    pub fn name(api_id: u16) -> &'static str {
        match api_id {
            COUNTER_CONTROL => "COUNTER_CONTROL",
            COUNTER_COUNT => "COUNTER_COUNT",
            _ => "UNKNOWN",
        }
    }
}

/// Fields of a 29-bit CAN arbitration id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameIdParts {
    pub device_type: u8,
    pub manufacturer: u8,
    pub api_id: u16,
    pub device_number: u8,
}

/// Build the 29-bit arbitration id.
///
/// Layout: device type in bits 24-28, manufacturer in bits 16-23, API id in
/// bits 6-15 and device number in bits 0-5. Fields wider than their slot are
/// masked.
pub const fn frame_id(device_type: u8, manufacturer: u8, api_id: u16, device_number: u8) -> u32 {
    ((device_type as u32 & 0x1F) << 24)
        | ((manufacturer as u32) << 16)
        | ((api_id as u32 & 0x3FF) << 6)
        | (device_number as u32 & 0x3F)
}

/// Split a 29-bit arbitration id into its fields
pub const fn split_frame_id(id: u32) -> FrameIdParts {
    FrameIdParts {
        device_type: ((id >> 24) & 0x1F) as u8,
        manufacturer: (id >> 16) as u8,
        api_id: ((id >> 6) & 0x3FF) as u16,
        device_number: (id & 0x3F) as u8,
    }
}
