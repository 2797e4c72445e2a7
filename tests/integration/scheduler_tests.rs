//! The four tasks driven together by the scheduler on a manual clock.

use boxmon::app::boot::{Hardware, build_scheduler};
use boxmon::app::events::AppEvent;
use boxmon::config::SystemConfig;
use boxmon::scheduler::{Tick, TaskScheduler};
use boxmon::sensors::SensorSet;

use crate::mock_hw::{
    FixedSoil, ManualClock, MockNetwork, RecordingDisplay, RecordingSink, Rig, ScriptedCloud, SetClock,
};

/// Raw count that normalises to 5 % with the default calibration.
const DRY_RAW: i16 = 17_000;

struct Bench {
    scheduler: TaskScheduler,
    clock: ManualClock,
    rig: Rig,
    cloud: ScriptedCloud,
    screen: RecordingDisplay,
    network: MockNetwork,
    sink: RecordingSink,
}

fn bench(network: MockNetwork) -> Bench {
    let (rig, actuators) = Rig::new();
    let cloud = ScriptedCloud::default();
    let screen = RecordingDisplay::default();
    let sink = RecordingSink::default();
    let sensors = SensorSet {
        soil: Some(Box::new(FixedSoil::new(DRY_RAW))),
        ..Default::default()
    };
    let hw = Hardware {
        sensors,
        actuators,
        display: Box::new(screen.clone()),
        cloud: Box::new(cloud.clone()),
        network: Box::new(network.clone()),
        clock: Box::new(SetClock::at(12, 0)),
        events: Box::new(sink.clone()),
    };
    Bench {
        scheduler: build_scheduler(SystemConfig::default(), hw),
        clock: ManualClock::default(),
        rig,
        cloud,
        screen,
        network,
        sink,
    }
}

/// Tick until `until_ms`, jumping the clock to each wake time.
fn run_until(b: &mut Bench, until_ms: u64) -> Option<Tick> {
    while b.clock.ms.get() <= until_ms {
        match b.scheduler.tick(&b.clock) {
            Tick::Idle { wake_at_ms } => b.clock.set(wake_at_ms.max(b.clock.ms.get() + 1)),
            restart @ Tick::Restart(_) => return Some(restart),
        }
    }
    None
}

#[test]
fn first_tick_runs_every_task_in_order() {
    let mut b = bench(MockNetwork::up());
    let tick = b.scheduler.tick(&b.clock);
    for slot in 0..4 {
        assert_eq!(b.scheduler.runs(slot), Some(1));
    }
    // Soil-only acquisition completes in one unit of work.
    assert_eq!(b.scheduler.context().readings.cycle, 1);
    assert!(matches!(tick, Tick::Idle { wake_at_ms } if wake_at_ms > 0));
    assert_eq!(b.screen.frames.borrow().len(), 1);
    assert_eq!(b.cloud.push_count(), 1);
}

#[test]
fn dry_soil_starts_pump_after_debounce_window() {
    let mut b = bench(MockNetwork::up());

    // Relay ticks at 0, 5, .. 25 s: the sixth dry sample confirms.
    assert!(run_until(&mut b, 24_000).is_none());
    assert_eq!(b.rig.pump.last(), Some(false));
    assert!(run_until(&mut b, 26_000).is_none());
    assert_eq!(b.rig.pump.last(), Some(true));
    assert!(b.scheduler.context().actuators.pump.as_ref().is_some_and(|p| p.relay.is_enabled()));
}

#[test]
fn revoked_permission_reaches_the_pump() {
    let mut b = bench(MockNetwork::up());
    b.cloud.script_pull(Ok("0"));

    assert!(run_until(&mut b, 40_000).is_none());
    assert_eq!(*b.rig.pump.writes.borrow(), vec![false]);
    assert!(b.sink.count(|e| matches!(e, AppEvent::PumpBlocked(_))) > 0);
}

#[test]
fn offline_frames_end_with_the_banner() {
    let mut b = bench(MockNetwork::up());
    b.network.connected.set(false);

    run_until(&mut b, 4_500);
    let frames = b.screen.frames.borrow();
    assert!(frames.len() >= 2);
    assert!(frames[1].contains("OFFLINE"));
}

#[test]
fn dead_network_restarts_after_the_limit() {
    let mut b = bench(MockNetwork::down());

    // Cloud cycles at 0, 60, .. 300 s; the sixth failure exceeds 5.
    let tick = run_until(&mut b, 400_000);
    match tick {
        Some(Tick::Restart(req)) => {
            assert_eq!(req.task, "cloud-sync");
            assert_eq!(req.reason, "network unrecoverable");
        }
        other => panic!("expected restart, got {:?}", other),
    }
    assert!(b.clock.ms.get() >= 300_000);
    assert!(b.network.reconnects.get() >= 6);
}
