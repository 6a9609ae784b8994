//! One-shot ESP-IDF peripheral configuration plus the raw register
//! helpers the hardware adapters build on.
//!
//! Uses raw `esp-idf-sys` calls. Configuration runs once from `main()`
//! before the executor starts; after that only the executor thread
//! touches these pins.

use esp_idf_svc::sys::*;
use log::info;

use crate::config::BridgeConfig;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

/// Configure every pin and ADC channel the enabled peripherals use.
pub fn init_peripherals(config: &BridgeConfig) -> Result<(), HwInitError> {
    // SAFETY: called once from main() before any task runs; single-threaded.
    unsafe {
        if let Some(c) = &config.climate {
            // Open-drain so the sensor can pull the line low; idles high.
            config_pin(c.pin, gpio_mode_t_GPIO_MODE_INPUT_OUTPUT_OD, true)?;
            gpio_set_level(i32::from(c.pin), 1);
        }
        if let Some(f) = &config.flame {
            config_pin(f.pin, gpio_mode_t_GPIO_MODE_INPUT, true)?;
        }
        if let Some(l) = &config.led {
            config_pin(l.led_pin, gpio_mode_t_GPIO_MODE_OUTPUT, false)?;
            config_pin(l.button_pin, gpio_mode_t_GPIO_MODE_INPUT, l.button_active_low)?;
        }
        if let Some(l) = &config.light {
            init_adc(l.adc_channel)?;
        }
    }
    info!("hw_init: peripherals configured");
    Ok(())
}

unsafe fn config_pin(pin: u8, mode: gpio_mode_t, pull_up: bool) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode,
        pull_up_en: if pull_up {
            gpio_pullup_t_GPIO_PULLUP_ENABLE
        } else {
            gpio_pullup_t_GPIO_PULLUP_DISABLE
        },
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: ADC1_HANDLE is written once in `init_adc()` before any reader
/// runs, and only the executor thread reads it afterwards.
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

unsafe fn init_adc(channel: u8) -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // The S3 one-shot driver only converts at 12 bits.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), u32::from(channel), &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!("hw_init: ADC1 channel {} configured", channel);
    Ok(())
}

pub fn adc1_read(channel: u8) -> Option<u16> {
    let mut raw: i32 = 0;
    // SAFETY: see adc1_handle().
    let ret = unsafe { adc_oneshot_read(adc1_handle(), u32::from(channel), &mut raw) };
    if ret != ESP_OK as i32 {
        return None;
    }
    Some(raw.max(0) as u16)
}

// ── GPIO ──────────────────────────────────────────────────────

pub fn gpio_read(pin: u8) -> bool {
    // SAFETY: register read on a configured pin.
    (unsafe { gpio_get_level(i32::from(pin)) }) != 0
}

pub fn gpio_write(pin: u8, high: bool) -> bool {
    // SAFETY: register write on a configured output pin.
    (unsafe { gpio_set_level(i32::from(pin), u32::from(high)) }) == ESP_OK as i32
}

/// Microseconds since boot.
pub fn now_us() -> i64 {
    // SAFETY: read-only timer access.
    unsafe { esp_timer_get_time() }
}

/// Busy-wait. Only for sub-millisecond protocol timing.
pub fn delay_us(us: u32) {
    // SAFETY: ROM delay loop, no shared state.
    unsafe { esp_rom_delay_us(us) }
}
