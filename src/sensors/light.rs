//! KY-018 photoresistor sampling.
//!
//! The module is a divider between the LDR and a fixed resistor, so the
//! raw ADC count falls as light rises. The published value is the
//! relative LDR resistance `(full_scale - r) * K / r`.

use std::rc::Rc;

use log::{debug, warn};

use crate::app::ports::{AnalogInput, Timebase};
use crate::config::LightConfig;
use crate::error::{Error, Result, SensorError};
use crate::gate::ReadinessGate;
use crate::node::Node;
use crate::property::{Datatype, Property};
use crate::task::{Interval, Peripheral, wait_then_every};

/// Narrow a 12-bit ADC count to the 10-bit range the transform expects.
pub fn to_ten_bit(raw12: u16) -> u16 {
    raw12.min(4095) >> 2
}

/// Transform a raw reading. `raw == 0` has no finite result and
/// readings above full scale cannot come from the divider.
pub fn resistance(raw: u16, full_scale: u16, scale: f32) -> core::result::Result<f32, SensorError> {
    if raw == 0 {
        return Err(SensorError::InvalidReading);
    }
    if raw > full_scale {
        return Err(SensorError::OutOfRange);
    }
    Ok(f32::from(full_scale - raw) * scale / f32::from(raw))
}

pub struct LightPeripheral<A> {
    adc: A,
    interval: Interval,
    full_scale: u16,
    scale: f32,
    node: Rc<Node>,
    light: Rc<Property>,
}

impl<A: AnalogInput> LightPeripheral<A> {
    pub fn new(adc: A, config: &LightConfig) -> Result<Self> {
        let interval = Interval::from_secs(config.interval_secs)?;
        if config.full_scale == 0 {
            return Err(Error::Config("light full scale must be positive"));
        }

        let mut node = Node::new("ky018", "KY-018 Light Sensor", "ky018")?;
        let light = node.add_property(
            Property::new("light", "Light", Datatype::Float)?
                .with_format("0:1023")?
                .with_unit("lum")
                .with_default(0.0_f32)?,
        )?;

        Ok(Self {
            adc,
            interval,
            full_scale: config.full_scale,
            scale: config.scale,
            node: Rc::new(node),
            light,
        })
    }

    pub fn sample(&mut self) -> Result<f32> {
        let raw = self.adc.read_raw()?;
        let value = resistance(raw, self.full_scale, self.scale)?;
        self.light.set(value)?;
        debug!("ky018: raw={} light={}", raw, value);
        Ok(value)
    }
}

impl<A: AnalogInput> Peripheral for LightPeripheral<A> {
    fn node(&self) -> Rc<Node> {
        self.node.clone()
    }

    async fn run<T: Timebase>(mut self, gate: &ReadinessGate, time: &T) {
        let period = self.interval.as_ms();
        wait_then_every(gate, time, period, |_| {
            if let Err(e) = self.sample() {
                warn!("ky018: skipping cycle: {}", e);
            }
        })
        .await;
    }
}
