//! SensorBridge firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  EspInput / EspOutput   EspAdc   Dht22   IoTimebase            │
//! │  (embedded-hal pins)    (ADC1)   (1-wire) (Timebase)           │
//! │  LogPropertySink (PropertySink)                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  Bridge: Device · Nodes · Properties · ReadinessGate   │    │
//! │  │  climate · light · flame · led tasks + publisher       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use sensorbridge::adapters::hardware::{Dht22, EspAdc, EspInput, EspOutput};
use sensorbridge::adapters::log_sink::LogPropertySink;
use sensorbridge::adapters::time::IoTimebase;
use sensorbridge::config::BridgeConfig;
use sensorbridge::device::Device;
use sensorbridge::drivers::hw_init;
use sensorbridge::drivers::led::LedPeripheral;
use sensorbridge::gate::ReadinessGate;
use sensorbridge::runtime::Bridge;
use sensorbridge::sensors::{ClimatePeripheral, FlamePeripheral, LightPeripheral};

/// Board wiring baked in at build time; the reference board otherwise.
const CONFIG_JSON: Option<&str> = option_env!("SENSORBRIDGE_CONFIG");

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("SensorBridge v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = match CONFIG_JSON {
        Some(json) => BridgeConfig::from_json(json)?,
        None => BridgeConfig::default(),
    };
    config.validate()?;

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals(&config)?;

    let device = Device::new(&config.device.id, &config.device.name)?;
    let gate = ReadinessGate::new();
    let time = IoTimebase::new();
    let bridge = Bridge::new(&device, &gate, &time);

    if let Some(c) = &config.climate {
        bridge.register(ClimatePeripheral::new(Dht22::new(c.pin), c)?)?;
    }
    if let Some(l) = &config.light {
        bridge.register(LightPeripheral::new(EspAdc::new(l.adc_channel), l)?)?;
    }
    if let Some(f) = &config.flame {
        bridge.register(FlamePeripheral::new(EspInput::new(f.pin), f)?)?;
    }
    if let Some(l) = &config.led {
        bridge.register(LedPeripheral::new(
            EspOutput::new(l.led_pin),
            EspInput::new(l.button_pin),
            l,
        )?)?;
    }
    bridge.attach_sink(LogPropertySink::new(device.id()), config.publish_interval_ms);

    // ── 4. Ready ──────────────────────────────────────────────
    // This build has no network transport; attaching the log sink is the
    // whole announcement, so the gate opens straight away.
    gate.set_ready();

    futures_lite::future::block_on(bridge.run());
    Ok(())
}
