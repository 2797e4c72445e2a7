//! Cloud sync task: push telemetry, pull the pump permission.
//!
//! ## Failure policy
//!
//! | Failure                 | Recovery                                   |
//! |-------------------------|--------------------------------------------|
//! | host unreachable        | reconnect, retry once                      |
//! | out of memory           | [`CloudPort::reclaim`], retry once         |
//! | anything else           | log, give up until the next cycle          |
//! | malformed permission    | keep the previous value                    |
//! | link down, reconnect    | count; past the limit request a restart    |
//! | fails, every cycle      |                                            |

use core::time::Duration;

use log::{error, info, warn};

use crate::app::context::Context;
use crate::app::events::AppEvent;
use crate::app::ports::{CloudPort, NetworkPort};
use crate::config::SystemConfig;
use crate::error::{CloudError, NetworkError};
use crate::scheduler::{Step, Task};
use crate::telemetry::{TelemetryPayload, parse_permission};

/// What [`with_retry`] did.
#[derive(Debug)]
pub struct Attempt<T> {
    pub result: Result<T, CloudError>,
    pub attempts: u8,
    /// Outcome of the reconnect made before the retry, if one was made.
    pub reconnect: Option<Result<(), NetworkError>>,
}

/// Run `op`, retrying once after a recovery step if the failure class
/// allows it.
pub fn with_retry<T>(
    cloud: &mut dyn CloudPort,
    network: &mut dyn NetworkPort,
    what: &str,
    mut op: impl FnMut(&mut dyn CloudPort) -> Result<T, CloudError>,
) -> Attempt<T> {
    let first = op(cloud);
    let mut reconnect = None;
    match first {
        Err(CloudError::HostUnreachable) => {
            warn!("Cloud {}: host unreachable, reconnecting and retrying once", what);
            let r = network.reconnect();
            if let Err(e) = r {
                warn!("Cloud {}: reconnect failed: {}", what, e);
            }
            reconnect = Some(r);
        }
        Err(CloudError::OutOfMemory) => {
            warn!("Cloud {}: out of memory, reclaiming and retrying once", what);
            cloud.reclaim();
        }
        _ => {
            return Attempt {
                result: first,
                attempts: 1,
                reconnect,
            };
        }
    }
    Attempt {
        result: op(cloud),
        attempts: 2,
        reconnect,
    }
}

pub struct CloudSyncTask {
    cloud: Box<dyn CloudPort>,
    permission_key: heapless::String<32>,
    period: Duration,
    reconnect_limit: u8,
    offline_cycles: u8,
    /// Reconnect already made by a retry during the current cycle.
    reconnect: Option<Result<(), NetworkError>>,
    granted: bool,
}

impl CloudSyncTask {
    pub fn new(cloud: Box<dyn CloudPort>, config: &SystemConfig) -> Self {
        Self {
            cloud,
            permission_key: config.cloud.permission_key.clone(),
            period: Duration::from_secs(u64::from(config.intervals.network_secs)),
            reconnect_limit: config.network.reconnect_attempts,
            offline_cycles: 0,
            reconnect: None,
            granted: true,
        }
    }

    fn push(&mut self, ctx: &mut Context) {
        let payload = TelemetryPayload::build(&ctx.readings, &ctx.actuators);
        let attempt = with_retry(self.cloud.as_mut(), ctx.network.as_mut(), "push", |c| c.push(&payload));
        self.reconnect = attempt.reconnect.or(self.reconnect);
        match attempt.result {
            Ok(()) => {
                info!("Telemetry pushed: {} fields", payload.len());
                ctx.events.emit(&AppEvent::TelemetryPushed {
                    fields: payload.len(),
                    attempts: attempt.attempts,
                });
            }
            Err(e) => {
                error!("Telemetry push abandoned this cycle: {}", e);
                ctx.events.emit(&AppEvent::TelemetryDropped(e));
            }
        }
    }

    fn pull_permission(&mut self, ctx: &mut Context) {
        let key = self.permission_key.clone();
        let attempt = with_retry(self.cloud.as_mut(), ctx.network.as_mut(), "pull", |c| c.pull(&key));
        self.reconnect = attempt.reconnect.or(self.reconnect);
        let raw = match attempt.result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Pump permission fetch failed, keeping {}: {}", self.granted, e);
                return;
            }
        };
        let Some(granted) = parse_permission(&raw) else {
            warn!("Ignoring malformed pump permission {:?}, keeping {}", raw, self.granted);
            return;
        };
        if granted != self.granted {
            info!("Cloud pump permission changed: {} -> {}", self.granted, granted);
            ctx.events.emit(&AppEvent::PermissionChanged { granted });
        }
        self.granted = granted;
        ctx.permission.signal(granted);
    }

    fn resync_clock_if_needed(&mut self, ctx: &mut Context) {
        if ctx.clock.now().is_synced() {
            return;
        }
        match ctx.clock.resync() {
            Ok(()) => info!("Clock resynchronised"),
            Err(e) => warn!("Clock resync failed: {}", e),
        }
    }
}

impl Task for CloudSyncTask {
    fn name(&self) -> &'static str {
        "cloud-sync"
    }

    fn run(&mut self, ctx: &mut Context) -> Step {
        self.reconnect = None;
        self.push(ctx);

        if ctx.network.is_connected() {
            self.offline_cycles = 0;
            self.pull_permission(ctx);
            self.resync_clock_if_needed(ctx);
            return Step::Sleep(self.period);
        }

        warn!("Network down, pump permission not fetched");
        // A failed reconnect from the push retry already counts for this cycle.
        let reconnect = match self.reconnect.take() {
            Some(Err(e)) => Err(e),
            _ => ctx.network.reconnect(),
        };
        match reconnect {
            Ok(()) => {
                info!("Network reconnected");
                self.offline_cycles = 0;
            }
            Err(e) => {
                self.offline_cycles = self.offline_cycles.saturating_add(1);
                warn!(
                    "Reconnect failed ({}), {} of {} cycles offline",
                    e, self.offline_cycles, self.reconnect_limit
                );
                ctx.events.emit(&AppEvent::NetworkLost {
                    consecutive: self.offline_cycles,
                });
                if self.offline_cycles > self.reconnect_limit {
                    error!("Network unrecoverable, requesting restart");
                    return Step::Restart("network unrecoverable");
                }
            }
        }
        Step::Sleep(self.period)
    }
}
