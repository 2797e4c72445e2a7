//! Startup wiring: relays off, task registration, autostart abort.

use boxmon::app::boot::{Hardware, abort_autostart, build_scheduler};
use boxmon::app::events::AppEvent;
use boxmon::config::SystemConfig;
use boxmon::control::actuators::RelayId;
use boxmon::display;
use boxmon::sensors::SensorSet;

use crate::mock_hw::{MockNetwork, RecordingDisplay, RecordingSink, Rig, ScriptedCloud, SetClock};

#[test]
fn build_scheduler_switches_every_relay_off() {
    let (rig, actuators) = Rig::new();
    let sink = RecordingSink::default();
    let hw = Hardware {
        sensors: SensorSet::default(),
        actuators,
        display: Box::new(RecordingDisplay::default()),
        cloud: Box::new(ScriptedCloud::default()),
        network: Box::new(MockNetwork::up()),
        clock: Box::new(SetClock::unsynced()),
        events: Box::new(sink.clone()),
    };

    let scheduler = build_scheduler(SystemConfig::default(), hw);

    assert_eq!(*rig.pump.writes.borrow(), vec![false]);
    assert_eq!(*rig.fan.writes.borrow(), vec![false]);
    assert_eq!(*rig.light.writes.borrow(), vec![false]);
    for relay in RelayId::ALL {
        assert!(sink.contains(&AppEvent::RelayCommanded {
            relay,
            on: false,
            changed: false,
        }));
    }
    for slot in 0..4 {
        assert_eq!(scheduler.runs(slot), Some(0));
    }
}

#[test]
fn abort_shows_frame_and_emits_event() {
    let screen = RecordingDisplay::default();
    let sink = RecordingSink::default();

    abort_autostart(&mut screen.clone(), 16, &mut sink.clone());

    let frames = screen.frames.borrow();
    assert_eq!(frames.len(), 1);
    let rows: Vec<&str> = display::rows(&frames[0], 16).map(str::trim).collect();
    assert_eq!(rows, vec!["", "AUTOSTART", "ABORTED"]);
    assert!(sink.contains(&AppEvent::AutostartAborted));
}
