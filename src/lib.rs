//! Boxmon grow-box controller library.
//!
//! Exposes the domain modules for the binary, the integration tests and
//! the fuzz targets.  Board-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` inside each module; everything else
//! builds and runs on the host.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod display;
pub mod error;
pub mod pins;
pub mod scheduler;
pub mod sensors;
pub mod tasks;
pub mod telemetry;

pub mod adapters;
pub mod drivers;
