//! Relay policy against recording relay lines.

use boxmon::app::context::Context;
use boxmon::app::events::AppEvent;
use boxmon::config::SystemConfig;
use boxmon::control::policy::{Decision, PumpBlock, RelayPolicyEngine};
use boxmon::control::schedule::WallClock;
use boxmon::scheduler::Task;
use boxmon::sensors::readings::{Climate, SensorReadings};
use boxmon::tasks::RelayTask;

use crate::mock_hw::{MockNetwork, RecordingSink, Rig, SetClock};

fn soil(avg: f32) -> SensorReadings {
    SensorReadings {
        soil_average: Some(avg),
        ..Default::default()
    }
}

fn feed(
    engine: &mut RelayPolicyEngine,
    actuators: &mut boxmon::control::actuators::ActuatorState,
    sink: &mut RecordingSink,
    avg: f32,
    n: usize,
) -> Decision {
    let mut last = Decision::Hold;
    for _ in 0..n {
        last = engine
            .evaluate(&soil(avg), actuators, WallClock::UNSYNCED, sink)
            .pump;
    }
    last
}

#[test]
fn pump_needs_full_window_on_and_off() {
    let (rig, mut actuators) = Rig::new();
    let mut sink = RecordingSink::default();
    let mut engine = RelayPolicyEngine::new(&SystemConfig::default());

    assert_eq!(feed(&mut engine, &mut actuators, &mut sink, 45.0, 6), Decision::Hold);
    assert_eq!(rig.pump.count(), 0);

    assert_eq!(feed(&mut engine, &mut actuators, &mut sink, 20.0, 5), Decision::Hold);
    assert_eq!(rig.pump.count(), 0);
    assert_eq!(feed(&mut engine, &mut actuators, &mut sink, 20.0, 1), Decision::Switched(true));
    assert_eq!(rig.pump.last(), Some(true));

    // One wet sample is not enough to stop it.
    assert_eq!(feed(&mut engine, &mut actuators, &mut sink, 45.0, 1), Decision::Hold);
    assert_eq!(feed(&mut engine, &mut actuators, &mut sink, 45.0, 4), Decision::Hold);
    assert_eq!(rig.pump.last(), Some(true));
    assert_eq!(feed(&mut engine, &mut actuators, &mut sink, 45.0, 1), Decision::Switched(false));
    assert_eq!(*rig.pump.writes.borrow(), vec![true, false]);
}

#[test]
fn low_water_stops_pump_on_the_same_tick() {
    let (rig, mut actuators) = Rig::new();
    let mut sink = RecordingSink::default();
    let mut engine = RelayPolicyEngine::new(&SystemConfig::default());

    feed(&mut engine, &mut actuators, &mut sink, 20.0, 6);
    assert_eq!(rig.pump.last(), Some(true));

    rig.float.low.set(true);
    assert_eq!(feed(&mut engine, &mut actuators, &mut sink, 20.0, 1), Decision::Switched(false));
    assert_eq!(rig.pump.last(), Some(false));

    // Still dry, still low: blocked rather than restarted.
    assert_eq!(
        feed(&mut engine, &mut actuators, &mut sink, 20.0, 1),
        Decision::Blocked(PumpBlock::LowWater)
    );
    assert!(sink.contains(&AppEvent::PumpBlocked(PumpBlock::LowWater)));
    assert_eq!(rig.pump.count(), 2);
}

#[test]
fn fan_follows_debounced_humidity() {
    let (rig, mut actuators) = Rig::new();
    let mut sink = RecordingSink::default();
    let mut engine = RelayPolicyEngine::new(&SystemConfig::default());
    let humid = SensorReadings {
        climate: Some(Climate {
            temperature_c: 24.0,
            humidity_percent: 85.0,
        }),
        ..Default::default()
    };

    for _ in 0..5 {
        engine.evaluate(&humid, &mut actuators, WallClock::UNSYNCED, &mut sink);
    }
    assert_eq!(rig.fan.count(), 0);
    let eval = engine.evaluate(&humid, &mut actuators, WallClock::UNSYNCED, &mut sink);
    assert_eq!(eval.fan, Decision::Switched(true));
    assert_eq!(rig.fan.last(), Some(true));
}

#[test]
fn light_untouched_until_clock_syncs() {
    let (rig, mut actuators) = Rig::new();
    let mut sink = RecordingSink::default();
    let mut engine = RelayPolicyEngine::new(&SystemConfig::default());
    let clock = SetClock::unsynced();
    let r = SensorReadings::default();

    let eval = engine.evaluate(&r, &mut actuators, clock.now.get(), &mut sink);
    assert_eq!(eval.light, Decision::ClockUnsynced);
    assert_eq!(rig.light.count(), 0);

    clock.set(8, 30);
    let eval = engine.evaluate(&r, &mut actuators, clock.now.get(), &mut sink);
    assert_eq!(eval.light, Decision::Switched(true));

    clock.set(9, 1);
    let eval = engine.evaluate(&r, &mut actuators, clock.now.get(), &mut sink);
    assert_eq!(eval.light, Decision::Switched(false));
    assert_eq!(*rig.light.writes.borrow(), vec![true, false]);
}

#[test]
fn failed_relay_write_keeps_remembered_state() {
    let (rig, mut actuators) = Rig::new();
    let mut sink = RecordingSink::default();
    let mut engine = RelayPolicyEngine::new(&SystemConfig::default());

    rig.pump.broken.set(true);
    assert_eq!(feed(&mut engine, &mut actuators, &mut sink, 20.0, 6), Decision::Failed);
    assert!(!actuators.pump.as_ref().map(|p| p.relay.is_enabled()).unwrap_or(true));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RelayFault { .. })), 1);

    // The next tick tries again.
    rig.pump.broken.set(false);
    assert_eq!(feed(&mut engine, &mut actuators, &mut sink, 20.0, 1), Decision::Switched(true));
}

#[test]
fn relay_task_applies_revoked_permission() {
    let (rig, actuators) = Rig::new();
    let sink = RecordingSink::default();
    let config = SystemConfig::default();
    let mut task = RelayTask::new(&config);
    let mut ctx = Context::new(
        config,
        actuators,
        Box::new(MockNetwork::up()),
        Box::new(SetClock::unsynced()),
        Box::new(sink.clone()),
    );
    ctx.readings.soil_average = Some(10.0);
    ctx.permission.signal(false);

    for _ in 0..6 {
        task.run(&mut ctx);
    }
    assert_eq!(rig.pump.count(), 0);
    assert!(!ctx.actuators.pump.as_ref().map(|p| p.permission()).unwrap_or(true));
    assert!(sink.contains(&AppEvent::PumpBlocked(PumpBlock::PermissionRevoked)));

    ctx.permission.signal(true);
    task.run(&mut ctx);
    assert_eq!(rig.pump.last(), Some(true));
}
