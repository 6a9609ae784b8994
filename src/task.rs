//! Peripheral task plumbing shared by every sampling and monitoring task.
//!
//! Each peripheral contributes a [`Node`] and a long-running task. The
//! task waits on the readiness gate once, then runs its body on a fixed
//! cadence forever. Sleeping goes through the [`Timebase`] so it suspends
//! only the calling task.

use core::num::NonZeroU32;
use std::rc::Rc;

use crate::app::ports::Timebase;
use crate::error::{Error, Result};
use crate::gate::ReadinessGate;
use crate::node::Node;

/// A sampling period, in whole seconds, always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval(NonZeroU32);

impl Interval {
    pub fn from_secs(secs: u32) -> Result<Self> {
        NonZeroU32::new(secs)
            .filter(|s| s.get() <= u32::MAX / 1000)
            .map(Self)
            .ok_or(Error::Config("interval must be a positive number of seconds"))
    }

    pub fn as_secs(self) -> u32 {
        self.0.get()
    }

    pub fn as_ms(self) -> u32 {
        self.0.get() * 1000
    }
}

/// A hardware peripheral exposed as one node plus one background task.
#[allow(async_fn_in_trait)]
pub trait Peripheral {
    /// The node this peripheral registers with the device.
    fn node(&self) -> Rc<Node>;

    /// The task body. Waits for readiness, then never returns.
    async fn run<T: Timebase>(self, gate: &ReadinessGate, time: &T);
}

/// Wait for the gate, then call `body` every `period_ms` forever.
///
/// The first call happens as soon as the gate is observed ready.
pub async fn wait_then_every<T: Timebase>(
    gate: &ReadinessGate,
    time: &T,
    period_ms: u32,
    mut body: impl FnMut(u64),
) {
    gate.wait_ready().await;
    loop {
        body(time.now_ms());
        time.sleep_ms(period_ms).await;
    }
}
