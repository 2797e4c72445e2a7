//! Relay policy: debounced on, eager off.
//!
//! ```text
//!            confirmed-dry ∧ permission ∧ ¬low-water
//!   ┌─────┐ ───────────────────────────────────────▶ ┌────┐
//!   │ OFF │                                          │ ON │
//!   └─────┘ ◀─────────────────────────────────────── └────┘
//!            confirmed-not-dry ∨ low-water ∨ ¬permission
//!                    (interlocks act on the same tick)
//! ```
//!
//! The fan follows the same shape on the humidity condition without
//! interlocks.  The light is driven straight from the schedule windows and
//! left alone while the wall clock is unsynchronised.

use heapless::Vec;
use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::config::{MAX_LIGHT_WINDOWS, SystemConfig, Thresholds};
use crate::control::actuators::{ActuatorState, Pump, Relay};
use crate::control::debounce::ConditionBuffer;
use crate::control::schedule::{ScheduleWindow, WallClock, is_within_schedule};
use crate::sensors::readings::SensorReadings;

/// Why a confirmed-dry soil did not start the pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpBlock {
    LowWater,
    PermissionRevoked,
}

/// Outcome of evaluating one relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to do.
    Hold,
    /// The relay was switched to the given state.
    Switched(bool),
    /// Pump wanted on but an interlock refused.
    Blocked(PumpBlock),
    /// Light left untouched because the clock is unsynchronised.
    ClockUnsynced,
    /// The relay line rejected the command.
    Failed,
    /// The relay is not installed.
    Absent,
}

/// Per-relay decisions of one evaluation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub pump: Decision,
    pub fan: Decision,
    pub light: Decision,
}

pub struct RelayPolicyEngine {
    soil_dry: ConditionBuffer,
    air_wet: ConditionBuffer,
    thresholds: Thresholds,
    light_windows: Vec<ScheduleWindow, MAX_LIGHT_WINDOWS>,
}

impl RelayPolicyEngine {
    pub fn new(config: &SystemConfig) -> Self {
        let window = usize::from(config.debounce_window);
        Self {
            soil_dry: ConditionBuffer::new(window),
            air_wet: ConditionBuffer::new(window),
            thresholds: config.thresholds,
            light_windows: config.light_windows.clone(),
        }
    }

    pub fn soil_dry(&self) -> &ConditionBuffer {
        &self.soil_dry
    }

    pub fn air_wet(&self) -> &ConditionBuffer {
        &self.air_wet
    }

    /// Push the current conditions into the debounce rings.
    ///
    /// A missing soil average records "not dry" so a dead probe winds the
    /// pump down instead of holding it on.  A missing climate reading
    /// records nothing.
    pub fn record(&mut self, readings: &SensorReadings) {
        let dry = readings
            .soil_average
            .is_some_and(|avg| avg < self.thresholds.soil_dry_percent);
        self.soil_dry.record(dry);

        if let Some(climate) = readings.climate {
            self.air_wet
                .record(climate.humidity_percent > self.thresholds.air_wet_percent);
        }
    }

    /// One full evaluation tick: record, then pump, fan and light.
    pub fn evaluate(
        &mut self,
        readings: &SensorReadings,
        actuators: &mut ActuatorState,
        now: WallClock,
        events: &mut dyn EventSink,
    ) -> Evaluation {
        self.record(readings);
        Evaluation {
            pump: match actuators.pump.as_mut() {
                Some(pump) => self.evaluate_pump(pump, events),
                None => Decision::Absent,
            },
            fan: match actuators.fan.as_mut() {
                Some(fan) => self.evaluate_fan(fan, events),
                None => Decision::Absent,
            },
            light: match actuators.light.as_mut() {
                Some(light) => self.evaluate_light(light, now, events),
                None => Decision::Absent,
            },
        }
    }

    pub fn evaluate_pump(&mut self, pump: &mut Pump, events: &mut dyn EventSink) -> Decision {
        let low_water = pump.refresh_level();
        let permission = pump.permission();

        if pump.relay.is_enabled() {
            let reason = if low_water {
                Some("water level low")
            } else if !permission {
                Some("cloud permission revoked")
            } else if self.soil_dry.is_confirmed_false() {
                None
            } else {
                return Decision::Hold;
            };
            match reason {
                Some(why) => warn!("Turning Pump relay OFF: {}", why),
                None => self.log_transition(&pump.relay, false, &self.soil_dry),
            }
            return switch(&mut pump.relay, false, events);
        }

        if !self.soil_dry.is_confirmed() {
            return Decision::Hold;
        }
        let block = if low_water {
            PumpBlock::LowWater
        } else if !permission {
            PumpBlock::PermissionRevoked
        } else {
            self.log_transition(&pump.relay, true, &self.soil_dry);
            return switch(&mut pump.relay, true, events);
        };
        warn!("Pump relay kept OFF while soil is dry: {:?}", block);
        events.emit(&AppEvent::PumpBlocked(block));
        Decision::Blocked(block)
    }

    pub fn evaluate_fan(&mut self, fan: &mut Relay, events: &mut dyn EventSink) -> Decision {
        let target = if !fan.is_enabled() && self.air_wet.is_confirmed() {
            true
        } else if fan.is_enabled() && self.air_wet.is_confirmed_false() {
            false
        } else {
            return Decision::Hold;
        };
        self.log_transition(fan, target, &self.air_wet);
        switch(fan, target, events)
    }

    pub fn evaluate_light(
        &self,
        light: &mut Relay,
        now: WallClock,
        events: &mut dyn EventSink,
    ) -> Decision {
        if !now.is_synced() {
            warn!("Light relay untouched: clock not synchronised");
            return Decision::ClockUnsynced;
        }
        let target = is_within_schedule(&self.light_windows, now.time);
        if target == light.is_enabled() {
            return Decision::Hold;
        }
        info!(
            "Turning Light relay {} at {}",
            if target { "ON" } else { "OFF" },
            now.time
        );
        switch(light, target, events)
    }

    fn log_transition(&self, relay: &Relay, on: bool, buf: &ConditionBuffer) {
        info!(
            "Turning {} relay {}. Confirmations: {} from {}",
            relay.id(),
            if on { "ON" } else { "OFF" },
            buf.streak(),
            buf.window()
        );
    }
}

fn switch(relay: &mut Relay, on: bool, events: &mut dyn EventSink) -> Decision {
    match relay.command(on, events) {
        Ok(_) => Decision::Switched(on),
        Err(e) => {
            debug!("{} relay command failed: {}", relay.id(), e);
            Decision::Failed
        }
    }
}
