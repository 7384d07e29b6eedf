//! Robot lifecycle hooks and the counter example robot
//!
//! The host scheduler calls the hooks of a [`TimedRobot`] periodically and on
//! transitions between the four robot modes. For each mode there is an init,
//! a periodic and an exit hook, plus robot-wide hooks called regardless of
//! mode.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use counter_device::CounterDevice;
use tracing::{debug, info};

use crate::error::RobotError;
use crate::hal::{DisplayDevice, OperatorInputs, PowerMonitor};

/// Result of a lifecycle hook
pub type HookResult = Result<(), RobotError>;

/// Description logged on startup
pub const DESCRIPTION: &str = "CAN Bus Example Program";

/// Potentiometer voltage that maps to full speed
pub const DEFAULT_POTENTIOMETER_FULL_SCALE: f64 = 5.0;

/// Robot operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RobotMode {
    Disabled,
    Autonomous,
    Teleop,
    Test,
}

impl RobotMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RobotMode::Disabled => "disabled",
            RobotMode::Autonomous => "autonomous",
            RobotMode::Teleop => "teleop",
            RobotMode::Test => "test",
        }
    }
}

/// Hooks invoked by the host scheduler. Every hook defaults to doing nothing.
pub trait TimedRobot {
    /// Called once on program startup
    fn robot_init(&mut self) -> HookResult {
        Ok(())
    }

    /// Called every cycle regardless of mode, after the mode periodic hook
    fn robot_periodic(&mut self) -> HookResult {
        Ok(())
    }

    fn disabled_init(&mut self) -> HookResult {
        Ok(())
    }

    fn disabled_periodic(&mut self) -> HookResult {
        Ok(())
    }

    fn disabled_exit(&mut self) -> HookResult {
        Ok(())
    }

    fn autonomous_init(&mut self) -> HookResult {
        Ok(())
    }

    fn autonomous_periodic(&mut self) -> HookResult {
        Ok(())
    }

    fn autonomous_exit(&mut self) -> HookResult {
        Ok(())
    }

    fn teleop_init(&mut self) -> HookResult {
        Ok(())
    }

    fn teleop_periodic(&mut self) -> HookResult {
        Ok(())
    }

    fn teleop_exit(&mut self) -> HookResult {
        Ok(())
    }

    fn test_init(&mut self) -> HookResult {
        Ok(())
    }

    fn test_periodic(&mut self) -> HookResult {
        Ok(())
    }

    fn test_exit(&mut self) -> HookResult {
        Ok(())
    }

    /// Dispatch to the init hook of `mode`
    fn mode_init(&mut self, mode: RobotMode) -> HookResult {
        match mode {
            RobotMode::Disabled => self.disabled_init(),
            RobotMode::Autonomous => self.autonomous_init(),
            RobotMode::Teleop => self.teleop_init(),
            RobotMode::Test => self.test_init(),
        }
    }

    /// Dispatch to the periodic hook of `mode`
    fn mode_periodic(&mut self, mode: RobotMode) -> HookResult {
        match mode {
            RobotMode::Disabled => self.disabled_periodic(),
            RobotMode::Autonomous => self.autonomous_periodic(),
            RobotMode::Teleop => self.teleop_periodic(),
            RobotMode::Test => self.test_periodic(),
        }
    }

    /// Dispatch to the exit hook of `mode`
    fn mode_exit(&mut self, mode: RobotMode) -> HookResult {
        match mode {
            RobotMode::Disabled => self.disabled_exit(),
            RobotMode::Autonomous => self.autonomous_exit(),
            RobotMode::Teleop => self.teleop_exit(),
            RobotMode::Test => self.test_exit(),
        }
    }

    /// One scheduler cycle: the mode periodic hook, then `robot_periodic`.
    ///
    /// `robot_periodic` runs even if the mode hook failed; the first error
    /// is returned.
    fn periodic_cycle(&mut self, mode: RobotMode) -> HookResult {
        let mode_result = self.mode_periodic(mode);
        let robot_result = self.robot_periodic();
        mode_result.and(robot_result)
    }
}

/// Map a potentiometer voltage to a speed byte.
///
/// `floor(256 * volts / full_scale)`, saturated to 0-255. Full scale itself
/// would give 256 and saturates to 255. Non-finite results map to 0.
pub fn speed_from_potentiometer(volts: f64, full_scale: f64) -> u8 {
    let scaled = (256.0 * volts / full_scale).floor();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, 255.0) as u8
}

/// Robot that drives the counting peripheral in autonomous mode and shows
/// the battery voltage while disabled
pub struct CounterRobot {
    device: CounterDevice,
    display: Arc<dyn DisplayDevice>,
    inputs: Arc<dyn OperatorInputs>,
    power: Arc<dyn PowerMonitor>,
    potentiometer_full_scale: f64,
    started_at: Option<DateTime<Utc>>,
}

impl CounterRobot {
    pub fn new(
        device: CounterDevice,
        display: Arc<dyn DisplayDevice>,
        inputs: Arc<dyn OperatorInputs>,
        power: Arc<dyn PowerMonitor>,
    ) -> Self {
        Self {
            device,
            display,
            inputs,
            power,
            potentiometer_full_scale: DEFAULT_POTENTIOMETER_FULL_SCALE,
            started_at: None,
        }
    }

    /// Set the potentiometer voltage that maps to full speed
    pub fn with_full_scale(mut self, volts: f64) -> Self {
        self.potentiometer_full_scale = volts;
        self
    }

    pub fn device(&self) -> &CounterDevice {
        &self.device
    }

    /// Time `robot_init` ran, if it has
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }
}

impl TimedRobot for CounterRobot {
    fn robot_init(&mut self) -> HookResult {
        let now = Utc::now();
        let info = self.device.device_info();
        info!("{}", DESCRIPTION);
        info!("Robot started up at {} UTC", now.format("%Y-%m-%d %H:%M:%S%.6f"));
        info!(
            "Counter device: number {} manufacturer {} type {}",
            info.device_number, info.manufacturer, info.device_type
        );
        self.started_at = Some(now);
        Ok(())
    }

    fn autonomous_init(&mut self) -> HookResult {
        self.display.clear_display();
        Ok(())
    }

    fn autonomous_periodic(&mut self) -> HookResult {
        let button_a = self.inputs.button_a();
        let button_b = self.inputs.button_b();
        let speed =
            speed_from_potentiometer(self.inputs.potentiometer(), self.potentiometer_full_scale);

        self.device.enable(button_a, button_b, speed)?;

        if let Some(reading) = self.device.read_count_reading()? {
            debug!("count {} at {} ms", reading.count, reading.timestamp_ms);
            self.display.display_message(&reading.to_hex());
        }
        Ok(())
    }

    fn autonomous_exit(&mut self) -> HookResult {
        self.device.disable()?;
        Ok(())
    }

    fn disabled_periodic(&mut self) -> HookResult {
        let voltage = self.power.battery_voltage();
        self.display.display_message(&format!("{:.2}", voltage));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_from_potentiometer() {
        assert_eq!(speed_from_potentiometer(0.0, 5.0), 0);
        assert_eq!(speed_from_potentiometer(1.0, 5.0), 51);
        assert_eq!(speed_from_potentiometer(2.5, 5.0), 128);
        assert_eq!(speed_from_potentiometer(4.99, 5.0), 255);
    }

    #[test]
    fn test_speed_saturates() {
        assert_eq!(speed_from_potentiometer(5.0, 5.0), 255);
        assert_eq!(speed_from_potentiometer(12.0, 5.0), 255);
        assert_eq!(speed_from_potentiometer(-0.5, 5.0), 0);
    }

    #[test]
    fn test_speed_degenerate_full_scale() {
        assert_eq!(speed_from_potentiometer(0.0, 0.0), 0);
        assert_eq!(speed_from_potentiometer(1.0, 0.0), 255);
        assert_eq!(speed_from_potentiometer(f64::NAN, 5.0), 0);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(RobotMode::Autonomous.as_str(), "autonomous");
        assert_eq!(RobotMode::Disabled.as_str(), "disabled");
    }

    #[derive(Default)]
    struct HookLog {
        calls: Vec<&'static str>,
    }

    impl TimedRobot for HookLog {
        fn robot_periodic(&mut self) -> HookResult {
            self.calls.push("robot_periodic");
            Ok(())
        }

        fn teleop_init(&mut self) -> HookResult {
            self.calls.push("teleop_init");
            Ok(())
        }

        fn test_periodic(&mut self) -> HookResult {
            self.calls.push("test_periodic");
            Ok(())
        }

        fn disabled_exit(&mut self) -> HookResult {
            self.calls.push("disabled_exit");
            Ok(())
        }
    }

    #[test]
    fn test_mode_dispatch() {
        let mut robot = HookLog::default();
        robot.mode_exit(RobotMode::Disabled).unwrap();
        robot.mode_init(RobotMode::Teleop).unwrap();
        robot.mode_periodic(RobotMode::Test).unwrap();
        // Unimplemented hooks are no-ops
        robot.mode_periodic(RobotMode::Autonomous).unwrap();
        assert_eq!(
            robot.calls,
            vec!["disabled_exit", "teleop_init", "test_periodic"]
        );
    }

    #[test]
    fn test_periodic_cycle_order() {
        let mut robot = HookLog::default();
        robot.periodic_cycle(RobotMode::Test).unwrap();
        robot.periodic_cycle(RobotMode::Autonomous).unwrap();
        assert_eq!(
            robot.calls,
            vec!["test_periodic", "robot_periodic", "robot_periodic"]
        );
    }
}
