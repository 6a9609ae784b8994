//! Mock hardware and sinks for integration tests.
//!
//! Records every published property change so tests can assert on the
//! full history, and scripts a bouncy push-button against the simulated
//! clock.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};
use sensorbridge::adapters::sim::SimClock;
use sensorbridge::app::ports::{PropertySink, Timebase};
use sensorbridge::node::Node;
use sensorbridge::property::Property;

// ── Recording sink ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub at_ms: u64,
    pub topic: String,
    pub payload: String,
}

/// Sink that records every publish with the simulated time it happened.
pub struct RecordingSink<'a> {
    clock: &'a SimClock,
    log: Rc<RefCell<Vec<Published>>>,
}

#[allow(dead_code)]
impl<'a> RecordingSink<'a> {
    pub fn new(clock: &'a SimClock) -> (Self, Rc<RefCell<Vec<Published>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                clock,
                log: log.clone(),
            },
            log,
        )
    }
}

impl PropertySink for RecordingSink<'_> {
    fn publish(&mut self, node: &Node, property: &Property, payload: &str) {
        self.log.borrow_mut().push(Published {
            at_ms: self.clock.now_ms(),
            topic: format!("{}/{}", node.id(), property.id()),
            payload: payload.to_owned(),
        });
    }
}

/// Payloads published on `topic`, in order.
#[allow(dead_code)]
pub fn payloads(log: &[Published], topic: &str) -> Vec<String> {
    log.iter()
        .filter(|p| p.topic == topic)
        .map(|p| p.payload.clone())
        .collect()
}

// ── Scripted button ───────────────────────────────────────────

/// Active-low button held down during each `[start, end)` window of the
/// simulated clock, chattering for `bounce_ms` after every edge.
pub struct TimedButton<'a> {
    clock: &'a SimClock,
    presses: Vec<(u64, u64)>,
    bounce_ms: u64,
}

#[allow(dead_code)]
impl<'a> TimedButton<'a> {
    pub fn new(clock: &'a SimClock, presses: &[(u64, u64)], bounce_ms: u64) -> Self {
        Self {
            clock,
            presses: presses.to_vec(),
            bounce_ms,
        }
    }

    fn pressed_at(&self, t: u64) -> bool {
        for &(start, end) in &self.presses {
            // Alternate every 10 ms right after an edge.
            if t >= start && t < start + self.bounce_ms {
                return (t - start) / 10 % 2 == 0;
            }
            if t >= end && t < end + self.bounce_ms {
                return (t - end) / 10 % 2 == 1;
            }
            if t >= start && t < end {
                return true;
            }
        }
        false
    }
}

impl ErrorType for TimedButton<'_> {
    type Error = ErrorKind;
}

impl InputPin for TimedButton<'_> {
    fn is_high(&mut self) -> Result<bool, ErrorKind> {
        Ok(!self.pressed_at(self.clock.now_ms()))
    }

    fn is_low(&mut self) -> Result<bool, ErrorKind> {
        Ok(self.pressed_at(self.clock.now_ms()))
    }
}
