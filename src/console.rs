//! Console-backed display and simulated operator hardware

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::hal::{DisplayDevice, OperatorInputs, PowerMonitor};

/// Display that writes messages to the log
///
/// Only changes are logged, since the robot refreshes the display every
/// cycle. All messages are kept for inspection.
#[derive(Default)]
pub struct ConsoleDisplay {
    messages: Mutex<Vec<String>>,
    current: Mutex<Option<String>>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently shown, `None` when blank
    pub fn current(&self) -> Option<String> {
        self.current.lock().map(|c| (*c).clone()).unwrap_or_default()
    }

    /// Every message displayed so far, in order
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| (*m).clone()).unwrap_or_default()
    }
}

impl DisplayDevice for ConsoleDisplay {
    fn clear_display(&self) {
        if let Ok(mut current) = self.current.lock() {
            if current.take().is_some() {
                debug!("display cleared");
            }
        }
    }

    fn display_message(&self, text: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(text.to_string());
        }
        if let Ok(mut current) = self.current.lock() {
            if current.as_deref() != Some(text) {
                info!("display: {}", text);
                *current = Some(text.to_string());
            }
        }
    }
}

/// Settable buttons and potentiometer
#[derive(Default)]
pub struct SimInputs {
    button_a: AtomicBool,
    button_b: AtomicBool,
    /// f64 bits
    potentiometer: AtomicU64,
}

impl SimInputs {
    pub fn new(button_a: bool, button_b: bool, potentiometer: f64) -> Self {
        Self {
            button_a: AtomicBool::new(button_a),
            button_b: AtomicBool::new(button_b),
            potentiometer: AtomicU64::new(potentiometer.to_bits()),
        }
    }

    pub fn set_button_a(&self, pressed: bool) {
        self.button_a.store(pressed, Ordering::Relaxed);
    }

    pub fn set_button_b(&self, pressed: bool) {
        self.button_b.store(pressed, Ordering::Relaxed);
    }

    pub fn set_potentiometer(&self, volts: f64) {
        self.potentiometer.store(volts.to_bits(), Ordering::Relaxed);
    }
}

impl OperatorInputs for SimInputs {
    fn button_a(&self) -> bool {
        self.button_a.load(Ordering::Relaxed)
    }

    fn button_b(&self) -> bool {
        self.button_b.load(Ordering::Relaxed)
    }

    fn potentiometer(&self) -> f64 {
        f64::from_bits(self.potentiometer.load(Ordering::Relaxed))
    }
}

/// Fixed battery voltage
pub struct SimPower {
    voltage: f64,
}

impl SimPower {
    pub fn new(voltage: f64) -> Self {
        Self { voltage }
    }
}

impl PowerMonitor for SimPower {
    fn battery_voltage(&self) -> f64 {
        self.voltage
    }
}
