//! Integration tests: bouncy button + inbound commands driving one LED.

use sensorbridge::adapters::sim::{SimClock, SimOutput};
use sensorbridge::config::{LedConfig, Polarity};
use sensorbridge::device::Device;
use sensorbridge::drivers::led::LedPeripheral;
use sensorbridge::gate::ReadinessGate;
use sensorbridge::property::PropertyValue;
use sensorbridge::runtime::Bridge;

use crate::mock_hw::{RecordingSink, TimedButton, payloads};

fn power(device: &Device) -> bool {
    device
        .property("led", "power")
        .and_then(|p| p.get())
        .and_then(|v| v.as_bool())
        .unwrap()
}

#[test]
fn each_bouncy_press_toggles_once() {
    let clock = SimClock::new();
    let gate = ReadinessGate::new();
    let device = Device::new("sensorbridge", "Sensor Bridge").unwrap();
    let bridge = Bridge::new(&device, &gate, &clock);

    let led = SimOutput::new();
    let button = TimedButton::new(&clock, &[(1_000, 1_500), (3_000, 3_400)], 30);
    bridge
        .register(LedPeripheral::new(led.clone(), button, &LedConfig::default()).unwrap())
        .unwrap();
    let (sink, log) = RecordingSink::new(&clock);
    bridge.attach_sink(sink, 250);

    gate.set_ready();
    clock.run_until(|| bridge.try_tick(), 2_000);
    assert!(power(&device));
    assert_eq!(led.level(), Some(false));

    clock.run_until(|| bridge.try_tick(), 5_000);
    assert!(!power(&device));
    assert_eq!(led.level(), Some(true));

    // Initial off, on after press one, off after press two.
    assert_eq!(payloads(&log.borrow(), "led/power"), ["false", "true", "false"]);
    // Pin writes: initial drive plus one per press.
    assert_eq!(led.writes(), 3);
}

#[test]
fn button_and_command_share_one_state() {
    let clock = SimClock::new();
    let gate = ReadinessGate::new();
    let device = Device::new("sensorbridge", "Sensor Bridge").unwrap();
    let bridge = Bridge::new(&device, &gate, &clock);

    let config = LedConfig {
        polarity: Polarity::ActiveHigh,
        ..LedConfig::default()
    };
    let led = SimOutput::new();
    let button = TimedButton::new(&clock, &[(2_000, 2_200)], 0);
    bridge
        .register(LedPeripheral::new(led.clone(), button, &config).unwrap())
        .unwrap();

    gate.set_ready();
    clock.run_until(|| bridge.try_tick(), 1_000);
    device.dispatch("led", "power", "true").unwrap();
    assert_eq!(led.level(), Some(true));

    // The press flips the commanded state, not a stale copy of it.
    clock.run_until(|| bridge.try_tick(), 3_000);
    assert!(!power(&device));
    assert_eq!(led.level(), Some(false));

    device.dispatch("led", "power", "false").unwrap();
    device.dispatch("led", "power", "false").unwrap();
    assert_eq!(
        device.property("led", "power").unwrap().get(),
        Some(PropertyValue::Boolean(false))
    );
    assert_eq!(led.level(), Some(false));
}

#[test]
fn button_ignored_until_ready() {
    let clock = SimClock::new();
    let gate = ReadinessGate::new();
    let device = Device::new("sensorbridge", "Sensor Bridge").unwrap();
    let bridge = Bridge::new(&device, &gate, &clock);

    let led = SimOutput::new();
    let button = TimedButton::new(&clock, &[(1_000, 1_500)], 0);
    bridge
        .register(LedPeripheral::new(led.clone(), button, &LedConfig::default()).unwrap())
        .unwrap();

    clock.run_until(|| bridge.try_tick(), 2_000);
    gate.set_ready();
    clock.run_until(|| bridge.try_tick(), 4_000);
    assert!(!power(&device));
    assert_eq!(led.writes(), 1);
}
