//! Application core: the shared task context, outbound events, the port
//! traits every adapter implements, and the startup wiring.
//!
//! Nothing in here touches a peripheral directly.  Hardware, the cloud
//! and the clock are reached only through the traits in [`ports`], which
//! keeps this layer testable on the host.

pub mod boot;
pub mod context;
pub mod events;
pub mod ports;
