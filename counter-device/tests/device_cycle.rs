//! Integration tests for the control/count exchange.
//!
//! A peripheral is emulated by decoding what the robot wrote on a
//! `SimCanBus` and answering with count packets, so the whole path
//! CounterDevice -> bus -> peripheral -> bus -> CounterDevice is exercised.

use std::sync::Arc;

use counter_device::{CounterDevice, DeviceError};
use counter_transport::{
    api, decode_counter_command, encode_counter_count, PrinterBus, PrinterConfig, SimCanBus,
};

/// Minimal peripheral: adds the speed to the count while enabled
fn peripheral_step(sim: &SimCanBus, count: &mut u16) {
    if let Some(packet) = sim.last_written(api::COUNTER_CONTROL) {
        let cmd = decode_counter_command(packet.data()).expect("robot sent a valid packet");
        if cmd.enabled {
            *count = count.wrapping_add(u16::from(cmd.speed));
        }
    }
    sim.create_bus_packet(api::COUNTER_COUNT, &encode_counter_count(*count), sim.now_ms())
        .unwrap();
}

#[test]
fn count_follows_speed_while_enabled() {
    let sim = Arc::new(SimCanBus::default());
    let dev = CounterDevice::new(sim.clone());
    let mut count = 0u16;

    for _ in 0..4 {
        dev.enable(false, false, 10).unwrap();
        peripheral_step(&sim, &mut count);
        sim.advance(20);
    }
    assert_eq!(dev.read_count().unwrap(), Some(40));

    dev.disable().unwrap();
    peripheral_step(&sim, &mut count);
    assert_eq!(dev.read_count().unwrap(), Some(40));

    let reading = dev.read_count_reading().unwrap().unwrap();
    assert_eq!(reading.timestamp_ms, 80);
    assert_eq!(reading.to_hex(), "0x28");
}

#[test]
fn count_wraps_at_u16() {
    let sim = Arc::new(SimCanBus::default());
    let dev = CounterDevice::new(sim.clone());
    let mut count = u16::MAX - 1;

    dev.enable(true, true, 3).unwrap();
    peripheral_step(&sim, &mut count);
    assert_eq!(dev.read_count().unwrap(), Some(1));
}

#[test]
fn monitored_bus_behaves_like_inner_bus() {
    let sim = Arc::new(SimCanBus::default());
    let bus = PrinterBus::wrap(sim.clone(), PrinterConfig::default().with_hex(true));
    let dev = CounterDevice::new(bus);
    let mut count = 7u16;

    dev.enable(false, true, 1).unwrap();
    peripheral_step(&sim, &mut count);
    assert_eq!(dev.read_count().unwrap(), Some(8));
    assert_eq!(sim.written().len(), 1);
}

#[test]
fn short_count_packet_is_reported() {
    let sim = Arc::new(SimCanBus::default());
    let dev = CounterDevice::new(sim.clone());
    sim.create_bus_packet(api::COUNTER_COUNT, &[0x01], 0).unwrap();

    match dev.read_count() {
        Err(e @ DeviceError::Malformed(_)) => assert!(e.is_malformed_packet()),
        other => panic!("expected malformed packet, got {:?}", other),
    }
}
