//! Relay state and the pump interlocks.
//!
//! `enabled` is the memory of the last command that reached the line.  It
//! is not read back from hardware.  Pump, fan and light share one [`Relay`]
//! capability; the pump adds its interlocks in [`Pump`].

use core::fmt;

use log::{error, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, LevelSensor, RelayDriver};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayId {
    Pump,
    Fan,
    Light,
}

impl RelayId {
    pub const ALL: [Self; 3] = [Self::Pump, Self::Fan, Self::Light];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Pump => "Pump",
            Self::Fan => "Fan",
            Self::Light => "Light",
        }
    }
}

impl fmt::Display for RelayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ───────────────────────────────────────────────────────────────
// Relay
// ───────────────────────────────────────────────────────────────

pub struct Relay {
    id: RelayId,
    line: u8,
    enabled: bool,
    driver: Box<dyn RelayDriver>,
}

impl Relay {
    pub fn new(id: RelayId, line: u8, driver: Box<dyn RelayDriver>) -> Self {
        Self {
            id,
            line,
            enabled: false,
            driver,
        }
    }

    pub fn id(&self) -> RelayId {
        self.id
    }

    /// GPIO line driving this relay.
    pub fn line(&self) -> u8 {
        self.line
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Drive the line and remember the state.  Returns whether the
    /// remembered state changed.  The command is emitted either way.
    pub fn command(&mut self, on: bool, events: &mut dyn EventSink) -> Result<bool> {
        if let Err(e) = self.driver.drive(on) {
            error!("{} relay (GPIO {}): {}", self.id, self.line, e);
            events.emit(&AppEvent::RelayFault { relay: self.id, error: e });
            return Err(e.into());
        }
        let changed = self.enabled != on;
        self.enabled = on;
        events.emit(&AppEvent::RelayCommanded {
            relay: self.id,
            on,
            changed,
        });
        Ok(changed)
    }
}

impl fmt::Debug for Relay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("id", &self.id)
            .field("line", &self.line)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

// ───────────────────────────────────────────────────────────────
// Pump
// ───────────────────────────────────────────────────────────────

/// Pump relay plus its two interlocks: the reservoir float switch and the
/// remote permission flag.
pub struct Pump {
    pub relay: Relay,
    level: Box<dyn LevelSensor>,
    low_water: bool,
    permission: bool,
}

impl Pump {
    /// Permission starts granted; the first cloud pull may revoke it.
    pub fn new(relay: Relay, level: Box<dyn LevelSensor>) -> Self {
        Self {
            relay,
            level,
            low_water: false,
            permission: true,
        }
    }

    /// Sample the float switch.  A failed read counts as low water.
    pub fn refresh_level(&mut self) -> bool {
        self.low_water = match self.level.is_low() {
            Ok(low) => low,
            Err(e) => {
                warn!("Water level read failed ({}), assuming low", e);
                true
            }
        };
        self.low_water
    }

    pub fn low_water(&self) -> bool {
        self.low_water
    }

    pub fn permission(&self) -> bool {
        self.permission
    }

    pub fn set_permission(&mut self, granted: bool) {
        self.permission = granted;
    }
}

impl fmt::Debug for Pump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pump")
            .field("relay", &self.relay)
            .field("low_water", &self.low_water)
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

// ───────────────────────────────────────────────────────────────
// ActuatorState
// ───────────────────────────────────────────────────────────────

/// Every installed relay.  A relay whose line failed to initialise is
/// `None` and never commanded.
#[derive(Debug, Default)]
pub struct ActuatorState {
    pub pump: Option<Pump>,
    pub fan: Option<Relay>,
    pub light: Option<Relay>,
}

impl ActuatorState {
    pub fn relay(&self, id: RelayId) -> Option<&Relay> {
        match id {
            RelayId::Pump => self.pump.as_ref().map(|p| &p.relay),
            RelayId::Fan => self.fan.as_ref(),
            RelayId::Light => self.light.as_ref(),
        }
    }

    /// `(id, enabled)` for each installed relay, in [`RelayId::ALL`] order.
    pub fn states(&self) -> impl Iterator<Item = (RelayId, bool)> + '_ {
        RelayId::ALL
            .into_iter()
            .filter_map(|id| self.relay(id).map(|r| (id, r.is_enabled())))
    }

    /// Command every installed relay off.  Used once at init; failures
    /// are logged and the remaining relays are still attempted.
    pub fn all_off(&mut self, events: &mut dyn EventSink) {
        let relays = [
            self.pump.as_mut().map(|p| &mut p.relay),
            self.fan.as_mut(),
            self.light.as_mut(),
        ];
        for relay in relays.into_iter().flatten() {
            let _ = relay.command(false, events);
        }
    }
}
