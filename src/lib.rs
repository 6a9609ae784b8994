//! SensorBridge firmware library.
//!
//! Exposes the bridge core for integration testing and host simulation.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod device;
pub mod drivers;
pub mod error;
pub mod gate;
pub mod node;
pub mod pins;
pub mod property;
pub mod runtime;
pub mod sensors;
pub mod task;

pub use error::{Error, Result};
