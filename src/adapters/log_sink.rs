//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every [`AppEvent`] to the `log`
//! facade: UART on the board, the tracing subscriber on the host.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::RelayCommanded { relay, on, changed } => {
                let state = if *on { "ON" } else { "OFF" };
                if *changed {
                    info!("RELAY | {} -> {}", relay, state);
                } else {
                    debug!("RELAY | {} stays {}", relay, state);
                }
            }
            AppEvent::RelayFault { relay, error } => {
                warn!("RELAY | {} fault: {}", relay, error);
            }
            AppEvent::PumpBlocked(block) => {
                warn!("PUMP  | blocked: {:?}", block);
            }
            AppEvent::PermissionChanged { granted } => {
                info!("CLOUD | pump permission {}", if *granted { "granted" } else { "revoked" });
            }
            AppEvent::TelemetryPushed { fields, attempts } => {
                info!("CLOUD | pushed {} fields in {} attempt(s)", fields, attempts);
            }
            AppEvent::TelemetryDropped(e) => {
                warn!("CLOUD | telemetry dropped: {}", e);
            }
            AppEvent::NetworkLost { consecutive } => {
                warn!("NET   | offline for {} consecutive cycle(s)", consecutive);
            }
            AppEvent::AutostartAborted => {
                warn!("BOOT  | autostart aborted");
            }
        }
    }
}
