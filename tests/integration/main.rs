//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below exercises one subsystem against the mock adapters in
//! `mock_hw`.  All tests run on the host with no real hardware.

mod boot_tests;
mod cloud_tests;
mod mock_hw;
mod relay_tests;
mod scheduler_tests;
