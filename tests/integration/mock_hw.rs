//! Mock adapters for integration tests.
//!
//! Every mock hands out a cloneable handle onto shared state, so a test
//! can box the adapter into the scheduler and still inspect what it
//! recorded afterwards.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::rc::Rc;

use boxmon::app::events::AppEvent;
use boxmon::app::ports::{
    ClockPort, CloudPort, DisplayPort, EventSink, LevelSensor, Monotonic, NetworkPort, RelayDriver, SoilAdc,
};
use boxmon::control::actuators::{ActuatorState, Pump, Relay, RelayId};
use boxmon::control::schedule::{TimeOfDay, WallClock};
use boxmon::error::{ActuatorError, CloudError, DisplayError, NetworkError, SensorError};
use boxmon::telemetry::TelemetryPayload;

// ── Relay lines ───────────────────────────────────────────────

/// Relay driver that records every level it is asked to drive.
#[derive(Clone, Default)]
pub struct RecordingLine {
    pub writes: Rc<RefCell<Vec<bool>>>,
    pub broken: Rc<Cell<bool>>,
}

impl RecordingLine {
    pub fn last(&self) -> Option<bool> {
        self.writes.borrow().last().copied()
    }

    pub fn count(&self) -> usize {
        self.writes.borrow().len()
    }
}

impl RelayDriver for RecordingLine {
    fn drive(&mut self, on: bool) -> Result<(), ActuatorError> {
        if self.broken.get() {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.writes.borrow_mut().push(on);
        Ok(())
    }
}

/// Float switch controlled by the test.
#[derive(Clone, Default)]
pub struct FloatSwitch {
    pub low: Rc<Cell<bool>>,
}

impl LevelSensor for FloatSwitch {
    fn is_low(&mut self) -> Result<bool, SensorError> {
        Ok(self.low.get())
    }
}

/// Handles onto the three relay lines and the float switch.
pub struct Rig {
    pub pump: RecordingLine,
    pub fan: RecordingLine,
    pub light: RecordingLine,
    pub float: FloatSwitch,
}

impl Rig {
    pub fn new() -> (Self, ActuatorState) {
        let rig = Self {
            pump: RecordingLine::default(),
            fan: RecordingLine::default(),
            light: RecordingLine::default(),
            float: FloatSwitch::default(),
        };
        let actuators = ActuatorState {
            pump: Some(Pump::new(
                Relay::new(RelayId::Pump, 19, Box::new(rig.pump.clone())),
                Box::new(rig.float.clone()),
            )),
            fan: Some(Relay::new(RelayId::Fan, 5, Box::new(rig.fan.clone()))),
            light: Some(Relay::new(RelayId::Light, 18, Box::new(rig.light.clone()))),
        };
        (rig, actuators)
    }
}

// ── Sensors ───────────────────────────────────────────────────

/// Soil ADC returning the same raw count on every channel.
#[derive(Clone)]
pub struct FixedSoil {
    pub raw: Rc<Cell<i16>>,
}

impl FixedSoil {
    pub fn new(raw: i16) -> Self {
        Self {
            raw: Rc::new(Cell::new(raw)),
        }
    }
}

impl SoilAdc for FixedSoil {
    fn read_raw(&mut self, _channel: u8) -> Result<i16, SensorError> {
        Ok(self.raw.get())
    }
}

// ── Cloud ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum CloudCall {
    Push(usize),
    Pull(String),
    Reclaim,
}

/// Cloud port answering from per-operation scripts.  An exhausted script
/// succeeds (`push`) or returns `"1"` (`pull`).
#[derive(Clone, Default)]
pub struct ScriptedCloud {
    pub pushes: Rc<RefCell<VecDeque<Result<(), CloudError>>>>,
    pub pulls: Rc<RefCell<VecDeque<Result<String, CloudError>>>>,
    pub calls: Rc<RefCell<Vec<CloudCall>>>,
    pub last_payload: Rc<RefCell<Option<TelemetryPayload>>>,
}

impl ScriptedCloud {
    pub fn script_push(&self, r: Result<(), CloudError>) {
        self.pushes.borrow_mut().push_back(r);
    }

    pub fn script_pull(&self, r: Result<&str, CloudError>) {
        self.pulls.borrow_mut().push_back(r.map(str::to_string));
    }

    pub fn push_count(&self) -> usize {
        self.calls.borrow().iter().filter(|c| matches!(c, CloudCall::Push(_))).count()
    }

    pub fn pull_count(&self) -> usize {
        self.calls.borrow().iter().filter(|c| matches!(c, CloudCall::Pull(_))).count()
    }
}

impl CloudPort for ScriptedCloud {
    fn push(&mut self, payload: &TelemetryPayload) -> Result<(), CloudError> {
        self.calls.borrow_mut().push(CloudCall::Push(payload.len()));
        *self.last_payload.borrow_mut() = Some(payload.clone());
        self.pushes.borrow_mut().pop_front().unwrap_or(Ok(()))
    }

    fn pull(&mut self, key: &str) -> Result<String, CloudError> {
        self.calls.borrow_mut().push(CloudCall::Pull(key.to_string()));
        self.pulls.borrow_mut().pop_front().unwrap_or_else(|| Ok("1".to_string()))
    }

    fn reclaim(&mut self) {
        self.calls.borrow_mut().push(CloudCall::Reclaim);
    }
}

// ── Network ───────────────────────────────────────────────────

/// Link whose state and reconnect outcome the test controls.
#[derive(Clone)]
pub struct MockNetwork {
    pub connected: Rc<Cell<bool>>,
    pub reconnect_succeeds: Rc<Cell<bool>>,
    pub reconnects: Rc<Cell<u32>>,
}

impl MockNetwork {
    pub fn up() -> Self {
        Self {
            connected: Rc::new(Cell::new(true)),
            reconnect_succeeds: Rc::new(Cell::new(true)),
            reconnects: Rc::new(Cell::new(0)),
        }
    }

    pub fn down() -> Self {
        let n = Self::up();
        n.connected.set(false);
        n.reconnect_succeeds.set(false);
        n
    }
}

impl NetworkPort for MockNetwork {
    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn reconnect(&mut self) -> Result<(), NetworkError> {
        self.reconnects.set(self.reconnects.get() + 1);
        if self.reconnect_succeeds.get() {
            self.connected.set(true);
            Ok(())
        } else {
            Err(NetworkError::WifiConnectFailed)
        }
    }

    fn ip_address(&self) -> Option<Ipv4Addr> {
        self.connected.get().then(|| Ipv4Addr::new(10, 0, 0, 7))
    }
}

// ── Clocks ────────────────────────────────────────────────────

/// Wall clock set by the test; starts unsynchronised.
#[derive(Clone)]
pub struct SetClock {
    pub now: Rc<Cell<WallClock>>,
    pub resyncs: Rc<Cell<u32>>,
}

impl SetClock {
    pub fn unsynced() -> Self {
        Self {
            now: Rc::new(Cell::new(WallClock::UNSYNCED)),
            resyncs: Rc::new(Cell::new(0)),
        }
    }

    pub fn at(hour: u8, minute: u8) -> Self {
        let c = Self::unsynced();
        c.set(hour, minute);
        c
    }

    pub fn set(&self, hour: u8, minute: u8) {
        self.now.set(WallClock {
            year: 2026,
            month: 10,
            day: 19,
            time: TimeOfDay::new(hour, minute).expect("valid time"),
            second: 0,
        });
    }
}

impl ClockPort for SetClock {
    fn now(&self) -> WallClock {
        self.now.get()
    }

    fn resync(&mut self) -> Result<(), NetworkError> {
        self.resyncs.set(self.resyncs.get() + 1);
        Ok(())
    }
}

/// Monotonic clock advanced by hand.
#[derive(Default)]
pub struct ManualClock {
    pub ms: Cell<u64>,
}

impl ManualClock {
    pub fn advance(&self, ms: u64) {
        self.ms.set(self.ms.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.ms.set(ms);
    }
}

impl Monotonic for ManualClock {
    fn now_ms(&self) -> u64 {
        self.ms.get()
    }
}

// ── Display ───────────────────────────────────────────────────

/// Display that keeps every frame it was shown.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    pub frames: Rc<RefCell<Vec<String>>>,
}

impl DisplayPort for RecordingDisplay {
    fn show(&mut self, text: &str, _max_width: usize) -> Result<(), DisplayError> {
        self.frames.borrow_mut().push(text.to_string());
        Ok(())
    }
}

// ── Events ────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    pub events: Rc<RefCell<Vec<AppEvent>>>,
}

impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.borrow().iter().any(|e| e == event)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
