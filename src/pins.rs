//! GPIO / ADC assignments for the reference sensor board.
//!
//! These are the defaults `BridgeConfig` starts from; a board with
//! different wiring overrides them through configuration.

use crate::error::{Error, Result};

/// Highest GPIO number on the ESP32-S3.
pub const MAX_GPIO: u8 = 48;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line (external 10 kΩ pull-up).
pub const DHT22_GPIO: u8 = 5;

/// KY-026 flame sensor digital output. HIGH = flame detected.
pub const FLAME_GPIO: u8 = 4;

/// KY-018 photoresistor divider, ADC1 channel 0 (GPIO1).
pub const LIGHT_ADC_CHANNEL: u8 = 0;

/// ADC1 channels on the ESP32-S3 (GPIO1..=GPIO10).
pub const ADC1_CHANNELS: u8 = 10;

// ---------------------------------------------------------------------------
// LED + user button
// ---------------------------------------------------------------------------

/// On-board LED. Wired active-low on the reference board.
pub const LED_GPIO: u8 = 2;

/// BOOT button, active-low with internal pull-up.
pub const BUTTON_GPIO: u8 = 0;

/// Reject pin numbers the chip does not have.
pub fn check_gpio(pin: u8) -> Result<u8> {
    if pin > MAX_GPIO {
        return Err(Error::Config("GPIO number out of range"));
    }
    Ok(pin)
}

/// GPIO pad behind an ADC1 channel.
pub fn adc1_gpio(channel: u8) -> Result<u8> {
    if channel >= ADC1_CHANNELS {
        return Err(Error::Config("ADC1 channel out of range"));
    }
    Ok(channel + 1)
}
