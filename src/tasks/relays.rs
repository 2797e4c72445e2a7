//! Relay evaluation task.
//!
//! Applies any pending remote permission, then hands the latest snapshot
//! to the [`RelayPolicyEngine`].

use core::time::Duration;

use log::{debug, info};

use crate::app::context::Context;
use crate::config::SystemConfig;
use crate::control::policy::RelayPolicyEngine;
use crate::scheduler::{Step, Task};

pub struct RelayTask {
    engine: RelayPolicyEngine,
    period: Duration,
}

impl RelayTask {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            engine: RelayPolicyEngine::new(config),
            period: Duration::from_secs(u64::from(config.intervals.relay_secs)),
        }
    }
}

impl Task for RelayTask {
    fn name(&self) -> &'static str {
        "relays"
    }

    fn run(&mut self, ctx: &mut Context) -> Step {
        if let Some(granted) = ctx.permission.try_take() {
            if let Some(pump) = ctx.actuators.pump.as_mut() {
                if pump.permission() != granted {
                    info!("Pump permission now {}", if granted { "granted" } else { "revoked" });
                }
                pump.set_permission(granted);
            }
        }

        let now = ctx.clock.now();
        let eval = self
            .engine
            .evaluate(&ctx.readings, &mut ctx.actuators, now, ctx.events.as_mut());
        debug!(
            "Relays: pump={:?} fan={:?} light={:?} (soil streak {}/{})",
            eval.pump,
            eval.fan,
            eval.light,
            self.engine.soil_dry().streak(),
            self.engine.soil_dry().window()
        );
        Step::Sleep(self.period)
    }
}
