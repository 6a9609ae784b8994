//! DHT22 temperature / humidity sampling.
//!
//! The sensor answers a start pulse with a 40-bit frame:
//!
//! ```text
//!   [RH hi][RH lo][T hi][T lo][checksum]
//! ```
//!
//! Humidity and temperature are tenths of a unit; bit 7 of `T hi` is the
//! sign. The checksum is the low byte of the sum of the first four bytes.
//! Frame capture is the adapter's job; decoding lives here so it runs on
//! the host.

use std::rc::Rc;

use log::{debug, warn};

use crate::app::ports::{ClimateReading, ClimateSensor, Timebase};
use crate::config::ClimateConfig;
use crate::error::{Result, SensorError};
use crate::gate::ReadinessGate;
use crate::node::Node;
use crate::property::{Datatype, Property};
use crate::task::{Interval, Peripheral, wait_then_every};

/// Datasheet measuring range.
const TEMP_RANGE_C: core::ops::RangeInclusive<f32> = -40.0..=80.0;
const HUMIDITY_RANGE_PCT: core::ops::RangeInclusive<f32> = 0.0..=100.0;

/// Decode a raw DHT22 frame.
pub fn decode_frame(frame: [u8; 5]) -> core::result::Result<ClimateReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let humidity_pct = f32::from(u16::from_be_bytes([frame[0], frame[1]])) / 10.0;
    let magnitude = f32::from(u16::from_be_bytes([frame[2] & 0x7F, frame[3]])) / 10.0;
    let temperature_c = if frame[2] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };

    if !TEMP_RANGE_C.contains(&temperature_c) || !HUMIDITY_RANGE_PCT.contains(&humidity_pct) {
        return Err(SensorError::OutOfRange);
    }
    Ok(ClimateReading {
        temperature_c,
        humidity_pct,
    })
}

pub struct ClimatePeripheral<S> {
    sensor: S,
    interval: Interval,
    node: Rc<Node>,
    temperature: Rc<Property>,
    humidity: Rc<Property>,
}

impl<S: ClimateSensor> ClimatePeripheral<S> {
    pub fn new(sensor: S, config: &ClimateConfig) -> Result<Self> {
        let interval = Interval::from_secs(config.interval_secs)?;

        let mut node = Node::new("dht22", "DHT22 Climate Sensor", "dht22")?;
        let temperature = node.add_property(
            Property::new("temperature", "Temperature", Datatype::Float)?
                .with_format("-40:80")?
                .with_unit("°C")
                .with_default(0.0_f32)?,
        )?;
        let humidity = node.add_property(
            Property::new("humidity", "Humidity", Datatype::Float)?
                .with_format("0:100")?
                .with_unit("%"),
        )?;

        Ok(Self {
            sensor,
            interval,
            node: Rc::new(node),
            temperature,
            humidity,
        })
    }

    /// One measurement cycle. Nothing is written if the read fails.
    pub fn sample(&mut self) -> Result<ClimateReading> {
        let reading = self.sensor.measure()?;
        self.temperature.set(reading.temperature_c)?;
        self.humidity.set(reading.humidity_pct)?;
        debug!(
            "dht22: T={:.1}°C RH={:.1}%",
            reading.temperature_c, reading.humidity_pct
        );
        Ok(reading)
    }
}

impl<S: ClimateSensor> Peripheral for ClimatePeripheral<S> {
    fn node(&self) -> Rc<Node> {
        self.node.clone()
    }

    async fn run<T: Timebase>(mut self, gate: &ReadinessGate, time: &T) {
        let period = self.interval.as_ms();
        wait_then_every(gate, time, period, |_| {
            if let Err(e) = self.sample() {
                warn!("dht22: skipping cycle: {}", e);
            }
        })
        .await;
    }
}
