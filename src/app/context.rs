//! Shared context threaded through every task.
//!
//! `Context` is the blackboard the four tasks share.  The scheduler owns
//! it and lends it to one task at a time, so no locks are needed: a task
//! sees the state exactly as the previous unit of work left it.
//!
//! Ownership of the fields:
//!
//! | Field        | Written by          | Read by                     |
//! |--------------|---------------------|-----------------------------|
//! | `readings`   | acquisition         | display, relays, cloud sync |
//! | `actuators`  | relays              | display, cloud sync         |
//! | `permission` | cloud sync (signal) | relays (take)               |

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;

use crate::app::ports::{ClockPort, EventSink, NetworkPort};
use crate::config::SystemConfig;
use crate::control::actuators::ActuatorState;
use crate::sensors::readings::SensorReadings;

/// Latest remote pump permission, handed from cloud sync to the relay task.
pub type PermissionSignal = Signal<NoopRawMutex, bool>;

pub struct Context {
    pub config: SystemConfig,
    pub readings: SensorReadings,
    pub actuators: ActuatorState,
    pub network: Box<dyn NetworkPort>,
    pub clock: Box<dyn ClockPort>,
    pub events: Box<dyn EventSink>,
    pub permission: PermissionSignal,
}

impl Context {
    pub fn new(
        config: SystemConfig,
        actuators: ActuatorState,
        network: Box<dyn NetworkPort>,
        clock: Box<dyn ClockPort>,
        events: Box<dyn EventSink>,
    ) -> Self {
        let readings = SensorReadings::with_layout(&config.probes, config.soil.channels);
        Self {
            config,
            readings,
            actuators,
            network,
            clock,
            events,
            permission: Signal::new(),
        }
    }
}
