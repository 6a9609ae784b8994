//! Host simulation adapters.
//!
//! A manually advanced clock plus scripted pins and sensors, so tasks run
//! on the real executor with deterministic time and no hardware.
//!
//! ```text
//!   test ──advance_to()──▶ SimClock ──wake──▶ sleeping tasks
//!                              ▲
//!   executor.try_tick() ───────┘ (registers wakers on Pending)
//! ```

use core::cell::{Cell, RefCell};
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use std::rc::Rc;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};

use crate::app::ports::{AnalogInput, ClimateReading, ClimateSensor, Timebase};
use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Simulated monotonic clock. Time only moves when the test says so.
#[derive(Default)]
pub struct SimClock {
    now: Cell<u64>,
    timers: RefCell<Vec<(u64, Waker)>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward to `at_ms` and wake every expired sleeper.
    pub fn advance_to(&self, at_ms: u64) {
        if at_ms > self.now.get() {
            self.now.set(at_ms);
        }
        let now = self.now.get();
        let mut due = Vec::new();
        self.timers.borrow_mut().retain(|(deadline, waker)| {
            if *deadline <= now {
                due.push(waker.clone());
                false
            } else {
                true
            }
        });
        for waker in due {
            waker.wake();
        }
    }

    /// Earliest pending sleep deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.borrow().iter().map(|(d, _)| *d).min()
    }

    /// Drive `tick` (normally `executor.try_tick()`) until every task is
    /// idle, jumping the clock from deadline to deadline up to `end_ms`.
    pub fn run_until(&self, mut tick: impl FnMut() -> bool, end_ms: u64) {
        loop {
            while tick() {}
            match self.next_deadline() {
                Some(deadline) if deadline <= end_ms => self.advance_to(deadline),
                _ => break,
            }
        }
        self.advance_to(end_ms);
    }

    fn register(&self, deadline: u64, waker: &Waker) {
        self.timers.borrow_mut().push((deadline, waker.clone()));
    }
}

pub struct SimSleep<'a> {
    clock: &'a SimClock,
    deadline: u64,
}

impl Future for SimSleep<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.clock.now.get() >= self.deadline {
            Poll::Ready(())
        } else {
            self.clock.register(self.deadline, cx.waker());
            Poll::Pending
        }
    }
}

impl Timebase for SimClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&self, ms: u32) -> impl Future<Output = ()> + '_ {
        SimSleep {
            clock: self,
            deadline: self.now.get() + u64::from(ms),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Digital pins
// ───────────────────────────────────────────────────────────────

/// Input that plays back a fixed sequence, then holds the last level.
pub struct ScriptedInput {
    levels: Vec<bool>,
    next: usize,
    reads: Rc<Cell<usize>>,
}

impl ScriptedInput {
    pub fn new(levels: &[bool]) -> Self {
        Self {
            levels: levels.to_vec(),
            next: 0,
            reads: Rc::new(Cell::new(0)),
        }
    }

    /// Shared read counter, usable after the pin is moved into a task.
    pub fn read_counter(&self) -> Rc<Cell<usize>> {
        self.reads.clone()
    }
}

impl ErrorType for ScriptedInput {
    type Error = ErrorKind;
}

impl InputPin for ScriptedInput {
    fn is_high(&mut self) -> Result<bool, ErrorKind> {
        let level = self
            .levels
            .get(self.next)
            .or_else(|| self.levels.last())
            .copied()
            .ok_or(ErrorKind::Other)?;
        self.next += 1;
        self.reads.set(self.reads.get() + 1);
        Ok(level)
    }

    fn is_low(&mut self) -> Result<bool, ErrorKind> {
        self.is_high().map(|h| !h)
    }
}

/// Input whose level the test sets directly through a cloned handle.
#[derive(Clone)]
pub struct SharedInput {
    level: Rc<Cell<bool>>,
}

impl SharedInput {
    pub fn new(level: bool) -> Self {
        Self {
            level: Rc::new(Cell::new(level)),
        }
    }

    pub fn set_level(&self, high: bool) {
        self.level.set(high);
    }
}

impl ErrorType for SharedInput {
    type Error = ErrorKind;
}

impl InputPin for SharedInput {
    fn is_high(&mut self) -> Result<bool, ErrorKind> {
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, ErrorKind> {
        Ok(!self.level.get())
    }
}

#[derive(Default)]
struct OutputState {
    level: Option<bool>,
    writes: usize,
    failing: bool,
}

/// Output that records its level. Clones share state.
#[derive(Clone, Default)]
pub struct SimOutput {
    state: Rc<RefCell<OutputState>>,
}

impl SimOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last level written, `None` if never driven.
    pub fn level(&self) -> Option<bool> {
        self.state.borrow().level
    }

    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }

    /// Make subsequent writes fail.
    pub fn set_failing(&self, failing: bool) {
        self.state.borrow_mut().failing = failing;
    }

    fn write(&mut self, high: bool) -> Result<(), ErrorKind> {
        let mut s = self.state.borrow_mut();
        if s.failing {
            return Err(ErrorKind::Other);
        }
        s.level = Some(high);
        s.writes += 1;
        Ok(())
    }
}

impl ErrorType for SimOutput {
    type Error = ErrorKind;
}

impl OutputPin for SimOutput {
    fn set_low(&mut self) -> Result<(), ErrorKind> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), ErrorKind> {
        self.write(true)
    }
}

// ───────────────────────────────────────────────────────────────
// Sensors
// ───────────────────────────────────────────────────────────────

/// ADC that plays back raw counts (or failures), then repeats the last.
pub struct ScriptedAdc {
    readings: Vec<Result<u16, SensorError>>,
    next: usize,
}

impl ScriptedAdc {
    pub fn new(readings: &[Result<u16, SensorError>]) -> Self {
        Self {
            readings: readings.to_vec(),
            next: 0,
        }
    }
}

impl AnalogInput for ScriptedAdc {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        let r = self
            .readings
            .get(self.next)
            .or_else(|| self.readings.last())
            .copied()
            .unwrap_or(Err(SensorError::ReadFailed));
        self.next += 1;
        r
    }
}

/// Climate sensor that plays back readings (or failures), then repeats
/// the last, counting every measurement.
pub struct ScriptedClimate {
    readings: Vec<Result<ClimateReading, SensorError>>,
    next: usize,
    measurements: Rc<Cell<usize>>,
}

impl ScriptedClimate {
    pub fn new(readings: &[Result<ClimateReading, SensorError>]) -> Self {
        Self {
            readings: readings.to_vec(),
            next: 0,
            measurements: Rc::new(Cell::new(0)),
        }
    }

    pub fn measurement_counter(&self) -> Rc<Cell<usize>> {
        self.measurements.clone()
    }
}

impl ClimateSensor for ScriptedClimate {
    fn measure(&mut self) -> Result<ClimateReading, SensorError> {
        let r = self
            .readings
            .get(self.next)
            .or_else(|| self.readings.last())
            .copied()
            .unwrap_or(Err(SensorError::ReadFailed));
        self.next += 1;
        self.measurements.set(self.measurements.get() + 1);
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_completes_only_after_advance() {
        let clock = SimClock::new();
        let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
        let done = Rc::new(Cell::new(false));
        let d = done.clone();
        let c = &clock;
        executor
            .spawn(async move {
                c.sleep_ms(100).await;
                d.set(true);
            })
            .detach();

        while executor.try_tick() {}
        assert_eq!(clock.next_deadline(), Some(100));
        clock.advance_to(99);
        while executor.try_tick() {}
        assert!(!done.get());
        clock.advance_to(100);
        while executor.try_tick() {}
        assert!(done.get());
    }

    #[test]
    fn scripted_input_holds_last_level() {
        let mut pin = ScriptedInput::new(&[false, true]);
        assert_eq!(pin.is_high(), Ok(false));
        assert_eq!(pin.is_high(), Ok(true));
        assert_eq!(pin.is_high(), Ok(true));
        assert_eq!(pin.read_counter().get(), 3);
    }
}
