//! LED node: a settable `power` cell bound to a GPIO output, toggled by a
//! debounced button.
//!
//! Both writers go through [`LedControl::apply`], which drives the pin
//! first and updates the cell only if that succeeded, so the cell never
//! disagrees with the pin.
//!
//! ```text
//!   button task ──toggle()──┐
//!                           ├──▶ apply(on) ──▶ pin, then cell
//!   inbound cmd ──handler───┘
//! ```

use core::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{InputPin, OutputPin, PinState};
use log::{debug, info, warn};

use crate::app::ports::Timebase;
use crate::config::{LedConfig, Polarity};
use crate::drivers::button::{ButtonEvent, Debouncer, POLL_MS};
use crate::error::{ActuatorError, Error, PropertyError, Result, SensorError};
use crate::gate::ReadinessGate;
use crate::node::Node;
use crate::property::{Datatype, Property, PropertyValue};
use crate::task::{Peripheral, wait_then_every};

/// A GPIO output with a logical on/off mapped through the board polarity.
pub struct LedOutput<P> {
    pin: P,
    polarity: Polarity,
}

impl<P: OutputPin> LedOutput<P> {
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Self { pin, polarity }
    }

    pub fn drive(&mut self, on: bool) -> core::result::Result<(), ActuatorError> {
        let level = PinState::from(self.polarity.level(on));
        self.pin
            .set_state(level)
            .map_err(|_| ActuatorError::GpioWriteFailed)
    }
}

/// The pin and the cell, kept in step.
pub struct LedControl<P> {
    output: Rc<RefCell<LedOutput<P>>>,
    power: Rc<Property>,
}

impl<P> Clone for LedControl<P> {
    fn clone(&self) -> Self {
        Self {
            output: self.output.clone(),
            power: self.power.clone(),
        }
    }
}

impl<P: OutputPin> LedControl<P> {
    /// Current logical state; off before the first write.
    pub fn is_on(&self) -> bool {
        self.power
            .get()
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Drive the pin, then record the new state in the cell.
    pub fn apply(&self, on: bool) -> Result<()> {
        self.output.borrow_mut().drive(on)?;
        self.power.set(on)
    }

    /// Flip the current state. Returns the new state.
    pub fn toggle(&self) -> Result<bool> {
        let on = !self.is_on();
        self.apply(on)?;
        info!("led: toggled {}", if on { "on" } else { "off" });
        Ok(on)
    }
}

pub struct LedPeripheral<P, B> {
    control: LedControl<P>,
    button: B,
    button_active_low: bool,
    debouncer: Debouncer,
    node: Rc<Node>,
}

impl<P: OutputPin + 'static, B: InputPin> LedPeripheral<P, B> {
    /// Builds the node, binds the command handler and drives the LED to
    /// its default (off) state.
    pub fn new(pin: P, button: B, config: &LedConfig) -> Result<Self> {
        if config.debounce_ms == 0 {
            return Err(Error::Config("debounce window must be positive"));
        }

        let mut node = Node::new("led", "LED", "LED")?;
        let power = node.add_property(
            Property::new("power", "Power", Datatype::Boolean)?
                .settable()
                .with_default(false)?,
        )?;

        let output = Rc::new(RefCell::new(LedOutput::new(pin, config.polarity)));
        {
            let output = output.clone();
            power.bind_handler(move |value: &PropertyValue| {
                let on = value.as_bool().ok_or(PropertyError::DatatypeMismatch)?;
                output.borrow_mut().drive(on)?;
                debug!("led: command -> {}", on);
                Ok(())
            });
        }

        let control = LedControl { output, power };
        // Writing the cell here keeps it in step with the pin driven off.
        control.apply(false)?;

        Ok(Self {
            control,
            button,
            button_active_low: config.button_active_low,
            debouncer: Debouncer::new(config.debounce_ms),
            node: Rc::new(node),
        })
    }

    pub fn control(&self) -> LedControl<P> {
        self.control.clone()
    }

    /// Sample the button once; toggles on a debounced press.
    pub fn poll_button(&mut self, now_ms: u64) -> Result<Option<bool>> {
        let high = self.button.is_high().map_err(|_| SensorError::ReadFailed)?;
        let pressed = high != self.button_active_low;
        match self.debouncer.update(pressed, now_ms) {
            Some(ButtonEvent::Pressed) => self.control.toggle().map(Some),
            Some(ButtonEvent::Released) | None => Ok(None),
        }
    }
}

impl<P: OutputPin + 'static, B: InputPin> Peripheral for LedPeripheral<P, B> {
    fn node(&self) -> Rc<Node> {
        self.node.clone()
    }

    async fn run<T: Timebase>(mut self, gate: &ReadinessGate, time: &T) {
        wait_then_every(gate, time, POLL_MS, |now| {
            if let Err(e) = self.poll_button(now) {
                warn!("led: button poll failed: {}", e);
            }
        })
        .await;
    }
}
