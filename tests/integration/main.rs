//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises a full device against
//! simulated pins and the simulated clock. All tests run on the host with
//! no real hardware required.

#![cfg(not(target_os = "espidf"))]

mod device_tests;
mod led_tests;
mod mock_hw;
