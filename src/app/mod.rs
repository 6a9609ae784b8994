//! Application boundary.
//!
//! Peripheral tasks and the runtime never touch hardware directly; they
//! go through the **port traits** defined in [`ports`], which keeps the
//! bridge fully testable on the host with simulated adapters.

pub mod ports;
