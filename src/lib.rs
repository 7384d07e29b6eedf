// CAN Counter Example - Shared Library
// Robot-side orchestration of the counting peripheral, capability traits for
// the display and operator inputs, and the simulated hardware used by the CLI.

pub mod config;
pub mod console;
pub mod error;
pub mod hal;
pub mod robot;
pub mod sim;

pub use config::RobotConfig;
pub use console::{ConsoleDisplay, SimInputs, SimPower};
pub use error::RobotError;
pub use hal::{DisplayDevice, OperatorInputs, PowerMonitor};
pub use robot::{speed_from_potentiometer, CounterRobot, HookResult, RobotMode, TimedRobot};
pub use sim::SimCounter;
