//! Outbound application events.
//!
//! Tasks emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them: log to
//! serial, count them in a test, forward them upstream.

use crate::control::actuators::RelayId;
use crate::control::policy::PumpBlock;
use crate::error::{ActuatorError, CloudError};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A relay was commanded.  `changed` is false for an idempotent repeat.
    RelayCommanded { relay: RelayId, on: bool, changed: bool },

    /// Driving a relay line failed; the remembered state is unchanged.
    RelayFault { relay: RelayId, error: ActuatorError },

    /// The soil is confirmed dry but an interlock keeps the pump off.
    PumpBlocked(PumpBlock),

    /// The remote pump permission changed value.
    PermissionChanged { granted: bool },

    /// A telemetry batch was delivered.
    TelemetryPushed { fields: usize, attempts: u8 },

    /// A telemetry batch was abandoned for this cycle.
    TelemetryDropped(CloudError),

    /// A cloud cycle ended with the link down.
    NetworkLost { consecutive: u8 },

    /// The autostart pin was grounded at boot; the scheduler never started.
    AutostartAborted,
}
