//! Relay and input pin drivers, board initialisation and the watchdog.

pub mod hw_init;
pub mod relay;
pub mod watchdog;
