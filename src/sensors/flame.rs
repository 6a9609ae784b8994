//! KY-026 flame sensor: level-change publisher.
//!
//! The digital output is polled on a fixed cadence, but the `active`
//! cell is written only when the level differs from the last one seen,
//! so a steady level produces no traffic.

use std::rc::Rc;

use embedded_hal::digital::InputPin;
use log::{debug, info, warn};

use crate::app::ports::Timebase;
use crate::config::{Baseline, FlameConfig};
use crate::error::{Result, SensorError};
use crate::gate::ReadinessGate;
use crate::node::Node;
use crate::property::{Datatype, Property};
use crate::task::{Interval, Peripheral, wait_then_every};

/// Remembers the last observed level and reports only changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChangeDetector {
    last: Option<bool>,
}

impl LevelChangeDetector {
    pub const fn new(baseline: Baseline, initial_level: bool) -> Self {
        let last = match baseline {
            Baseline::Suppress => Some(initial_level),
            Baseline::Publish => None,
        };
        Self { last }
    }

    /// Feed one reading. Returns `Some(level)` if it must be published.
    pub fn observe(&mut self, level: bool) -> Option<bool> {
        if self.last == Some(level) {
            return None;
        }
        self.last = Some(level);
        Some(level)
    }

    pub const fn last(&self) -> Option<bool> {
        self.last
    }
}

pub struct FlamePeripheral<P> {
    pin: P,
    interval: Interval,
    detector: LevelChangeDetector,
    node: Rc<Node>,
    active: Rc<Property>,
}

impl<P: InputPin> FlamePeripheral<P> {
    pub fn new(pin: P, config: &FlameConfig) -> Result<Self> {
        let interval = Interval::from_secs(config.interval_secs)?;

        let mut node = Node::new("ky026", "KY-026 Flame Sensor", "KY026")?;
        let active = node.add_property(
            Property::new("active", "Flame", Datatype::Boolean)?
                .restore()
                .with_default(true)?,
        )?;

        Ok(Self {
            pin,
            interval,
            detector: LevelChangeDetector::new(config.baseline, config.initial_level),
            node: Rc::new(node),
            active,
        })
    }

    /// One poll. Returns the level written, if any.
    pub fn poll(&mut self) -> Result<Option<bool>> {
        let level = self.pin.is_high().map_err(|_| SensorError::ReadFailed)?;
        let Some(level) = self.detector.observe(level) else {
            return Ok(None);
        };
        self.active.set(level)?;
        if level {
            info!("ky026: flame detected");
        } else {
            info!("ky026: flame cleared");
        }
        Ok(Some(level))
    }
}

impl<P: InputPin> Peripheral for FlamePeripheral<P> {
    fn node(&self) -> Rc<Node> {
        self.node.clone()
    }

    async fn run<T: Timebase>(mut self, gate: &ReadinessGate, time: &T) {
        let period = self.interval.as_ms();
        wait_then_every(gate, time, period, |now| match self.poll() {
            Ok(Some(level)) => debug!("ky026: {} at {} ms", level, now),
            Ok(None) => {}
            Err(e) => warn!("ky026: skipping poll: {}", e),
        })
        .await;
    }
}
