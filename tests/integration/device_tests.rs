//! Integration tests: full device → publisher → sink, and inbound
//! commands routed through the device registry.

use sensorbridge::adapters::sim::{
    ScriptedAdc, ScriptedClimate, ScriptedInput, SharedInput, SimClock, SimOutput,
};
use sensorbridge::app::ports::ClimateReading;
use sensorbridge::config::BridgeConfig;
use sensorbridge::device::Device;
use sensorbridge::drivers::led::LedPeripheral;
use sensorbridge::error::{DecodeError, Error, SensorError};
use sensorbridge::gate::ReadinessGate;
use sensorbridge::property::PropertyValue;
use sensorbridge::runtime::Bridge;
use sensorbridge::sensors::{ClimatePeripheral, FlamePeripheral, LightPeripheral};

use crate::mock_hw::{RecordingSink, payloads};

const READING: ClimateReading = ClimateReading {
    temperature_c: 21.5,
    humidity_pct: 40.0,
};

/// Register all four reference peripherals on `bridge`.
fn register_reference_board<T: sensorbridge::app::ports::Timebase>(
    bridge: &Bridge<'_, T>,
    climate: ScriptedClimate,
    led_out: SimOutput,
) {
    let config = BridgeConfig::default();
    bridge
        .register(ClimatePeripheral::new(climate, config.climate.as_ref().unwrap()).unwrap())
        .unwrap();
    bridge
        .register(
            LightPeripheral::new(ScriptedAdc::new(&[Ok(512)]), config.light.as_ref().unwrap())
                .unwrap(),
        )
        .unwrap();
    bridge
        .register(
            FlamePeripheral::new(ScriptedInput::new(&[false]), config.flame.as_ref().unwrap())
                .unwrap(),
        )
        .unwrap();
    bridge
        .register(
            LedPeripheral::new(led_out, SharedInput::new(true), config.led.as_ref().unwrap())
                .unwrap(),
        )
        .unwrap();
}

#[test]
fn nodes_register_in_order_and_initial_state_is_published() {
    let clock = SimClock::new();
    let gate = ReadinessGate::new();
    let device = Device::new("sensorbridge", "Sensor Bridge").unwrap();
    let bridge = Bridge::new(&device, &gate, &clock);

    register_reference_board(&bridge, ScriptedClimate::new(&[Ok(READING)]), SimOutput::new());
    let (sink, log) = RecordingSink::new(&clock);
    bridge.attach_sink(sink, 250);
    assert_eq!(bridge.task_count(), 5);

    let ids: Vec<String> = device.nodes().iter().map(|n| n.id().to_owned()).collect();
    assert_eq!(ids, ["dht22", "ky018", "ky026", "led"]);

    gate.set_ready();
    clock.run_until(|| bridge.try_tick(), 1_000);

    let log = log.borrow();
    assert_eq!(payloads(&log, "dht22/temperature"), ["21.5"]);
    assert_eq!(payloads(&log, "dht22/humidity"), ["40"]);
    assert_eq!(payloads(&log, "ky018/light"), [(511.0_f32 * 10.0 / 512.0).to_string()]);
    assert_eq!(payloads(&log, "led/power"), ["false"]);
    // Flame stayed at its low baseline.
    assert!(payloads(&log, "ky026/active").is_empty());
    assert_eq!(log.len(), 4);
}

#[test]
fn nothing_is_published_before_ready() {
    let clock = SimClock::new();
    let gate = ReadinessGate::new();
    let device = Device::new("sensorbridge", "Sensor Bridge").unwrap();
    let bridge = Bridge::new(&device, &gate, &clock);

    let climate = ScriptedClimate::new(&[Ok(READING)]);
    let measured = climate.measurement_counter();
    register_reference_board(&bridge, climate, SimOutput::new());
    let (sink, log) = RecordingSink::new(&clock);
    bridge.attach_sink(sink, 250);

    clock.run_until(|| bridge.try_tick(), 300_000);
    assert!(log.borrow().is_empty());
    assert_eq!(measured.get(), 0);
}

#[test]
fn command_reaches_pin_and_is_published() {
    let clock = SimClock::new();
    let gate = ReadinessGate::new();
    let device = Device::new("sensorbridge", "Sensor Bridge").unwrap();
    let bridge = Bridge::new(&device, &gate, &clock);

    let led = SimOutput::new();
    register_reference_board(&bridge, ScriptedClimate::new(&[Ok(READING)]), led.clone());
    let (sink, log) = RecordingSink::new(&clock);
    bridge.attach_sink(sink, 250);

    gate.set_ready();
    clock.run_until(|| bridge.try_tick(), 1_000);

    device.dispatch_topic("led/power/set", "true").unwrap();
    // Active-low LED: on means the pin is driven low.
    assert_eq!(led.level(), Some(false));

    clock.run_until(|| bridge.try_tick(), 2_000);
    let log = log.borrow();
    assert_eq!(payloads(&log, "led/power"), ["false", "true"]);
    let last = log.iter().rfind(|p| p.topic == "led/power").unwrap();
    assert!(last.at_ms > 1_000 && last.at_ms <= 1_250);
}

#[test]
fn rejected_command_changes_nothing() {
    let clock = SimClock::new();
    let gate = ReadinessGate::new();
    let device = Device::new("sensorbridge", "Sensor Bridge").unwrap();
    let bridge = Bridge::new(&device, &gate, &clock);

    let led = SimOutput::new();
    register_reference_board(&bridge, ScriptedClimate::new(&[Ok(READING)]), led.clone());
    let (sink, log) = RecordingSink::new(&clock);
    bridge.attach_sink(sink, 250);

    gate.set_ready();
    clock.run_until(|| bridge.try_tick(), 1_000);
    let writes = led.writes();
    let published = log.borrow().len();

    assert_eq!(
        device.dispatch_topic("led/power/set", "on"),
        Err(Error::Decode(DecodeError::Boolean))
    );
    assert_eq!(
        device.dispatch_topic("ky026/active/set", "true"),
        Err(Error::Decode(DecodeError::NotSettable))
    );

    clock.run_until(|| bridge.try_tick(), 2_000);
    assert_eq!(led.writes(), writes);
    assert_eq!(log.borrow().len(), published);
    assert_eq!(
        device.property("led", "power").unwrap().get(),
        Some(PropertyValue::Boolean(false))
    );
}

#[test]
fn failed_sample_skips_one_cycle_only() {
    let clock = SimClock::new();
    let gate = ReadinessGate::new();
    let device = Device::new("sensorbridge", "Sensor Bridge").unwrap();
    let bridge = Bridge::new(&device, &gate, &clock);

    let climate = ScriptedClimate::new(&[Err(SensorError::Checksum), Ok(READING)]);
    register_reference_board(&bridge, climate, SimOutput::new());
    let (sink, log) = RecordingSink::new(&clock);
    bridge.attach_sink(sink, 250);

    gate.set_ready();
    clock.run_until(|| bridge.try_tick(), 59_999);
    assert!(payloads(&log.borrow(), "dht22/temperature").is_empty());

    clock.run_until(|| bridge.try_tick(), 61_000);
    let log = log.borrow();
    let temps: Vec<u64> = log
        .iter()
        .filter(|p| p.topic == "dht22/temperature")
        .map(|p| p.at_ms)
        .collect();
    assert_eq!(temps.len(), 1);
    assert!(temps[0] >= 60_000);
}

#[test]
fn tasks_keep_running_after_disconnect() {
    let clock = SimClock::new();
    let gate = ReadinessGate::new();
    let device = Device::new("sensorbridge", "Sensor Bridge").unwrap();
    let bridge = Bridge::new(&device, &gate, &clock);

    let climate = ScriptedClimate::new(&[Ok(READING)]);
    let measured = climate.measurement_counter();
    register_reference_board(&bridge, climate, SimOutput::new());

    gate.set_ready();
    clock.run_until(|| bridge.try_tick(), 30_000);
    gate.set_not_ready();
    assert_eq!(gate.session(), 1);

    clock.run_until(|| bridge.try_tick(), 120_000);
    assert_eq!(measured.get(), 3);
}

#[test]
fn changes_are_held_while_disconnected() {
    let clock = SimClock::new();
    let gate = ReadinessGate::new();
    let device = Device::new("sensorbridge", "Sensor Bridge").unwrap();
    let bridge = Bridge::new(&device, &gate, &clock);

    let led = SimOutput::new();
    register_reference_board(&bridge, ScriptedClimate::new(&[Ok(READING)]), led.clone());
    let (sink, log) = RecordingSink::new(&clock);
    bridge.attach_sink(sink, 250);

    gate.set_ready();
    clock.run_until(|| bridge.try_tick(), 1_000);
    gate.set_not_ready();

    // The pin follows the command even while disconnected.
    device.dispatch("led", "power", "true").unwrap();
    assert_eq!(led.level(), Some(false));

    clock.run_until(|| bridge.try_tick(), 2_000);
    assert_eq!(payloads(&log.borrow(), "led/power"), ["false"]);

    gate.set_ready();
    clock.run_until(|| bridge.try_tick(), 3_000);
    let log = log.borrow();
    assert_eq!(payloads(&log, "led/power"), ["false", "true"]);
    let last = log.iter().rfind(|p| p.topic == "led/power").unwrap();
    assert!(last.at_ms > 2_000 && last.at_ms <= 2_250);
}
