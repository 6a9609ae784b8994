//! Actuator drivers, button handling, and ESP-IDF peripheral setup.

pub mod button;
#[cfg(target_os = "espidf")]
pub mod hw_init;
pub mod led;
