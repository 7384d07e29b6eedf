//! Robot run against the simulated counting peripheral
//!
//! Drives the robot through a short match: a disabled period, an autonomous
//! period and back to disabled. The simulated peripheral answers after each
//! robot cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use can_counter::{
    ConsoleDisplay, CounterRobot, RobotConfig, RobotMode, SimCounter, SimInputs, SimPower,
    TimedRobot,
};
use counter_device::CounterDevice;
use counter_transport::{BoxedBus, CanDeviceInfo, PrinterBus, PrinterConfig, SimCanBus};
use tracing::{info, warn};

use super::CommandResult;

/// Options for a simulated run
pub struct SimOptions {
    pub cycles: Option<u32>,
    pub button_a: bool,
    pub button_b: bool,
    pub potentiometer: f64,
}

struct Harness {
    robot: CounterRobot,
    counter: SimCounter,
    sim_bus: Arc<SimCanBus>,
    period: Duration,
    running: Arc<AtomicBool>,
}

impl Harness {
    /// Run `cycles` periodic cycles in `mode`, returns false if interrupted
    async fn run_mode(&mut self, mode: RobotMode, cycles: u32) -> bool {
        info!("Entering {} ({} cycles)", mode.as_str(), cycles);
        if let Err(e) = self.robot.mode_init(mode) {
            warn!("{} init failed: {}", mode.as_str(), e);
        }

        let mut interval = tokio::time::interval(self.period);
        let mut completed = true;
        for _ in 0..cycles {
            interval.tick().await;
            if !self.running.load(Ordering::SeqCst) {
                completed = false;
                break;
            }
            self.cycle(mode);
        }

        if let Err(e) = self.robot.mode_exit(mode) {
            warn!("{} exit failed: {}", mode.as_str(), e);
        }
        completed
    }

    /// One robot cycle: mode periodic, then robot periodic, then the
    /// peripheral answers
    fn cycle(&mut self, mode: RobotMode) {
        if let Err(e) = self.robot.periodic_cycle(mode) {
            warn!("{} periodic failed: {}", mode.as_str(), e);
        }
        if let Err(e) = self.counter.step() {
            warn!("sim counter step failed: {}", e);
        }
        self.sim_bus.advance(self.period.as_millis() as u64);
    }
}

/// Run the simulated match
pub async fn run(
    config: &RobotConfig,
    opts: SimOptions,
    printer_config: Option<PrinterConfig>,
) -> CommandResult {
    let sim_bus = Arc::new(SimCanBus::new(CanDeviceInfo::team_use(
        config.device_number,
    )));
    let bus: BoxedBus = match printer_config {
        Some(cfg) => PrinterBus::wrap(sim_bus.clone(), cfg),
        None => sim_bus.clone() as BoxedBus,
    };

    let display = Arc::new(ConsoleDisplay::new());
    let inputs = Arc::new(SimInputs::new(
        opts.button_a,
        opts.button_b,
        opts.potentiometer,
    ));
    let power = Arc::new(SimPower::new(config.battery_voltage));

    let mut robot = CounterRobot::new(CounterDevice::new(bus), display.clone(), inputs, power)
        .with_full_scale(config.potentiometer_full_scale);
    robot.robot_init()?;

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .ok();

    let mut harness = Harness {
        robot,
        counter: SimCounter::new(sim_bus.clone()),
        sim_bus,
        period: Duration::from_millis(config.period_ms),
        running,
    };

    let autonomous_cycles = opts.cycles.unwrap_or(config.autonomous_cycles);
    let completed = harness
        .run_mode(RobotMode::Disabled, config.disabled_cycles)
        .await
        && harness
            .run_mode(RobotMode::Autonomous, autonomous_cycles)
            .await;

    if !completed {
        println!("\nInterrupted.");
    }

    // One disabled cycle so the peripheral sees the disable packet
    harness.cycle(RobotMode::Disabled);

    println!(
        "Final count: {} ({:#x}), display: {}",
        harness.counter.count(),
        harness.counter.count(),
        display.current().unwrap_or_default()
    );
    Ok(())
}
