//! Port traits: the boundary between bridge logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ peripheral task / runtime
//! ```
//!
//! Digital pins use the `embedded-hal` 1.0 traits directly; these ports
//! cover what `embedded-hal` does not: a cooperative timebase, the two
//! sensors that need a protocol driver, and the publishing side.

use core::future::Future;

use crate::error::SensorError;
use crate::node::Node;
use crate::property::Property;

// ───────────────────────────────────────────────────────────────
// Timebase (driven adapter: clock → tasks)
// ───────────────────────────────────────────────────────────────

/// Monotonic clock plus a non-blocking sleep.
///
/// Sleeping suspends only the calling task; other tasks on the executor
/// keep running.
pub trait Timebase {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;

    /// Suspend the calling task for `ms` milliseconds.
    fn sleep_ms(&self, ms: u32) -> impl Future<Output = ()> + '_;
}

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapter: hardware → bridge)
// ───────────────────────────────────────────────────────────────

/// One decoded climate measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Combined temperature / humidity sensor (DHT22 on the reference board).
pub trait ClimateSensor {
    /// Trigger a measurement and return the decoded result.
    fn measure(&mut self) -> Result<ClimateReading, SensorError>;
}

/// Single-channel ADC.
pub trait AnalogInput {
    /// Raw conversion result.
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Property sink (driven adapter: bridge → transport / log)
// ───────────────────────────────────────────────────────────────

/// Receives every property change the runtime's publisher collects.
///
/// A networked transport implements this by publishing `payload` on the
/// property's topic; the firmware default writes it to the serial log.
pub trait PropertySink {
    fn publish(&mut self, node: &Node, property: &Property, payload: &str);
}
