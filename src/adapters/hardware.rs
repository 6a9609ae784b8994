//! Hardware adapters: ESP32 GPIO, ADC and the DHT22 single-wire bus
//! behind the bridge's ports.
//!
//! This is the only module that touches real hardware. Pins must have
//! been configured by `drivers::hw_init::init_peripherals` first.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};

use crate::app::ports::{AnalogInput, ClimateReading, ClimateSensor};
use crate::drivers::hw_init;
use crate::sensors::light::to_ten_bit;
use crate::error::SensorError;
use crate::sensors::climate::decode_frame;

// ── Digital pins ──────────────────────────────────────────────

pub struct EspInput {
    gpio: u8,
}

impl EspInput {
    pub fn new(gpio: u8) -> Self {
        Self { gpio }
    }
}

impl ErrorType for EspInput {
    type Error = Infallible;
}

impl InputPin for EspInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(hw_init::gpio_read(self.gpio))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!hw_init::gpio_read(self.gpio))
    }
}

pub struct EspOutput {
    gpio: u8,
}

impl EspOutput {
    pub fn new(gpio: u8) -> Self {
        Self { gpio }
    }
}

impl ErrorType for EspOutput {
    type Error = ErrorKind;
}

impl OutputPin for EspOutput {
    fn set_low(&mut self) -> Result<(), ErrorKind> {
        if hw_init::gpio_write(self.gpio, false) {
            Ok(())
        } else {
            Err(ErrorKind::Other)
        }
    }

    fn set_high(&mut self) -> Result<(), ErrorKind> {
        if hw_init::gpio_write(self.gpio, true) {
            Ok(())
        } else {
            Err(ErrorKind::Other)
        }
    }
}

// ── ADC ───────────────────────────────────────────────────────

pub struct EspAdc {
    channel: u8,
}

impl EspAdc {
    pub fn new(channel: u8) -> Self {
        Self { channel }
    }
}

impl AnalogInput for EspAdc {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        hw_init::adc1_read(self.channel)
            .map(to_ten_bit)
            .ok_or(SensorError::ReadFailed)
    }
}

// ── DHT22 ─────────────────────────────────────────────────────

/// Host start pulse: hold the line low at least 1 ms.
const START_LOW_US: u32 = 1_100;
/// Longest any single phase of the response may last.
const PHASE_TIMEOUT_US: i64 = 100;
/// A high phase longer than this encodes a `1` bit (0 ≈ 26 µs, 1 ≈ 70 µs).
const ONE_THRESHOLD_US: i64 = 48;

pub struct Dht22 {
    gpio: u8,
}

impl Dht22 {
    pub fn new(gpio: u8) -> Self {
        Self { gpio }
    }

    /// Wait while the line is at `level`; returns how long that took.
    fn wait_while(&self, level: bool) -> Result<i64, SensorError> {
        let start = hw_init::now_us();
        while hw_init::gpio_read(self.gpio) == level {
            if hw_init::now_us() - start > PHASE_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
        }
        Ok(hw_init::now_us() - start)
    }

    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        if !hw_init::gpio_write(self.gpio, false) {
            return Err(SensorError::ReadFailed);
        }
        hw_init::delay_us(START_LOW_US);
        if !hw_init::gpio_write(self.gpio, true) {
            return Err(SensorError::ReadFailed);
        }

        // Release → sensor pulls low 80 µs → high 80 µs → first bit.
        self.wait_while(true)?;
        self.wait_while(false)?;
        self.wait_while(true)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            self.wait_while(false)?;
            let high_us = self.wait_while(true)?;
            if high_us > ONE_THRESHOLD_US {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }
}

impl ClimateSensor for Dht22 {
    fn measure(&mut self) -> Result<ClimateReading, SensorError> {
        let frame = self.read_frame();
        // Leave the bus idle high whatever happened.
        hw_init::gpio_write(self.gpio, true);
        decode_frame(frame?)
    }
}
