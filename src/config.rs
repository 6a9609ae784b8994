//! Bridge configuration.
//!
//! Which peripherals exist, where they are wired, and how often they are
//! sampled. `Default` mirrors the reference board; a peripheral set to
//! `null` in JSON is not built at all, while an omitted one keeps its
//! default wiring.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins;
use crate::property::{Id, Text, bounded};
use crate::task::Interval;

// ---------------------------------------------------------------------------
// Shared enums
// ---------------------------------------------------------------------------

/// Physical level that turns an output on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    /// Pin level (`true` = high) that represents the logical state `on`.
    pub const fn level(self, on: bool) -> bool {
        match self {
            Self::ActiveHigh => on,
            Self::ActiveLow => !on,
        }
    }
}

/// How a level-change publisher treats its first reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Baseline {
    /// Assume the configured initial level; the first reading is
    /// published only if it differs.
    #[default]
    Suppress,
    /// Publish the first reading unconditionally.
    Publish,
}

// ---------------------------------------------------------------------------
// Per-peripheral sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub id: Id,
    pub name: Text,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            id: bounded("sensorbridge").unwrap_or_default(),
            name: bounded("Sensor Bridge").unwrap_or_default(),
        }
    }
}

/// DHT22 temperature / humidity sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    pub pin: u8,
    pub interval_secs: u32,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            pin: pins::DHT22_GPIO,
            interval_secs: 60,
        }
    }
}

/// KY-018 photoresistor on an ADC channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub adc_channel: u8,
    pub interval_secs: u32,
    /// Raw reading at the top of the ADC range.
    pub full_scale: u16,
    /// Divider constant `K` in `(full_scale - r) * K / r`.
    pub scale: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            adc_channel: pins::LIGHT_ADC_CHANNEL,
            interval_secs: 60,
            full_scale: 1023,
            scale: 10.0,
        }
    }
}

/// KY-026 flame sensor digital output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlameConfig {
    pub pin: u8,
    pub interval_secs: u32,
    pub baseline: Baseline,
    /// Level assumed before the first reading under `Baseline::Suppress`.
    pub initial_level: bool,
}

impl Default for FlameConfig {
    fn default() -> Self {
        Self {
            pin: pins::FLAME_GPIO,
            interval_secs: 1,
            baseline: Baseline::Suppress,
            initial_level: false,
        }
    }
}

/// On-board LED plus the button that toggles it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedConfig {
    pub led_pin: u8,
    pub button_pin: u8,
    pub polarity: Polarity,
    pub button_active_low: bool,
    /// A button level must hold this long before it is accepted.
    pub debounce_ms: u32,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            led_pin: pins::LED_GPIO,
            button_pin: pins::BUTTON_GPIO,
            polarity: Polarity::ActiveLow,
            button_active_low: true,
            debounce_ms: crate::drivers::button::DEBOUNCE_MS,
        }
    }
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub device: DeviceConfig,
    pub climate: Option<ClimateConfig>,
    pub light: Option<LightConfig>,
    pub flame: Option<FlameConfig>,
    pub led: Option<LedConfig>,
    /// How often the publisher collects pending property changes.
    pub publish_interval_ms: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            climate: Some(ClimateConfig::default()),
            light: Some(LightConfig::default()),
            flame: Some(FlameConfig::default()),
            led: Some(LedConfig::default()),
            publish_interval_ms: 250,
        }
    }
}

impl BridgeConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|_| Error::Config("malformed configuration JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no peripheral could be built from.
    pub fn validate(&self) -> Result<()> {
        crate::property::parse_id(&self.device.id)?;
        if self.publish_interval_ms == 0 {
            return Err(Error::Config("publish interval must be positive"));
        }

        let mut used: heapless::Vec<u8, 8> = heapless::Vec::new();
        let mut claim = |pin: u8| -> Result<()> {
            pins::check_gpio(pin)?;
            if used.contains(&pin) {
                return Err(Error::Config("GPIO assigned to two peripherals"));
            }
            used.push(pin)
                .map_err(|_| Error::Config("too many GPIO assignments"))
        };

        if let Some(c) = &self.climate {
            claim(c.pin)?;
            Interval::from_secs(c.interval_secs)?;
        }
        if let Some(f) = &self.flame {
            claim(f.pin)?;
            Interval::from_secs(f.interval_secs)?;
        }
        if let Some(l) = &self.led {
            claim(l.led_pin)?;
            claim(l.button_pin)?;
            if l.debounce_ms == 0 {
                return Err(Error::Config("debounce window must be positive"));
            }
        }
        if let Some(l) = &self.light {
            claim(pins::adc1_gpio(l.adc_channel)?)?;
            Interval::from_secs(l.interval_secs)?;
            if l.full_scale == 0 {
                return Err(Error::Config("light full scale must be positive"));
            }
            if !(l.scale.is_finite() && l.scale > 0.0) {
                return Err(Error::Config("light scale must be a positive number"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = BridgeConfig::default();
        c.validate().unwrap();
        assert_eq!(c.climate.as_ref().unwrap().interval_secs, 60);
        assert_eq!(c.flame.as_ref().unwrap().interval_secs, 1);
        assert_eq!(c.led.as_ref().unwrap().polarity, Polarity::ActiveLow);
    }

    #[test]
    fn serde_roundtrip() {
        let c = BridgeConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2 = BridgeConfig::from_json(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn omitted_sections_keep_defaults_and_null_disables() {
        let c = BridgeConfig::from_json(r#"{ "light": null, "flame": { "baseline": "publish" } }"#)
            .unwrap();
        assert!(c.light.is_none());
        assert_eq!(c.climate, Some(ClimateConfig::default()));
        let flame = c.flame.unwrap();
        assert_eq!(flame.baseline, Baseline::Publish);
        assert_eq!(flame.pin, pins::FLAME_GPIO);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(BridgeConfig::from_json(r#"{ "climate": { "interval_secs": 0 } }"#).is_err());
        assert!(BridgeConfig::from_json(r#"{ "flame": { "pin": 49 } }"#).is_err());
        assert!(BridgeConfig::from_json(r#"{ "led": { "debounce_ms": 0 } }"#).is_err());
        assert!(BridgeConfig::from_json(r#"{ "light": { "full_scale": 0 } }"#).is_err());
        assert!(BridgeConfig::from_json(r#"{ "publish_interval_ms": 0 }"#).is_err());
        assert!(BridgeConfig::from_json("not json").is_err());
    }

    #[test]
    fn rejects_shared_pins() {
        let err = BridgeConfig::from_json(r#"{ "flame": { "pin": 5 } }"#).unwrap_err();
        assert_eq!(err, Error::Config("GPIO assigned to two peripherals"));
    }

    #[test]
    fn light_channel_is_checked_against_digital_pins() {
        // ADC1 channel 3 sits on GPIO4, the flame input.
        let err = BridgeConfig::from_json(r#"{ "light": { "adc_channel": 3 } }"#).unwrap_err();
        assert_eq!(err, Error::Config("GPIO assigned to two peripherals"));
        let err = BridgeConfig::from_json(r#"{ "light": { "adc_channel": 10 } }"#).unwrap_err();
        assert_eq!(err, Error::Config("ADC1 channel out of range"));
        assert!(BridgeConfig::from_json(r#"{ "light": { "adc_channel": 5 } }"#).is_ok());
    }

    #[test]
    fn polarity_maps_logical_to_physical() {
        assert!(Polarity::ActiveHigh.level(true));
        assert!(!Polarity::ActiveLow.level(true));
        assert!(Polarity::ActiveLow.level(false));
    }
}
