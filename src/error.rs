//! Robot error types

use counter_device::DeviceError;
use thiserror::Error;

/// Errors raised from robot lifecycle hooks
#[derive(Error, Debug)]
pub enum RobotError {
    /// Counter device error
    #[error("Counter device error: {0}")]
    Device(#[from] DeviceError),
}
