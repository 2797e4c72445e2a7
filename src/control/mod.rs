//! Relay control: debounce rings, relay state, schedule windows and the
//! policy that ties them together.

pub mod actuators;
pub mod debounce;
pub mod policy;
pub mod schedule;
