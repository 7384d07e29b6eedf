//! Capability traits for the hardware around the robot controller
//!
//! The display board, its buttons and potentiometer, and the controller's
//! power monitor are owned by the host runtime. The robot only sees them
//! through these traits so it can run against simulated hardware.

/// Character display (e.g. a 4-digit alphanumeric board)
pub trait DisplayDevice: Send + Sync {
    /// Blank the display
    fn clear_display(&self);

    /// Show a message; rendering and truncation are up to the device
    fn display_message(&self, text: &str);
}

/// Operator controls on the display board
pub trait OperatorInputs: Send + Sync {
    fn button_a(&self) -> bool;

    fn button_b(&self) -> bool;

    /// Potentiometer reading in volts (0 to the board's full scale)
    fn potentiometer(&self) -> f64;
}

/// Controller power monitor
pub trait PowerMonitor: Send + Sync {
    /// Battery voltage in volts
    fn battery_voltage(&self) -> f64;
}
