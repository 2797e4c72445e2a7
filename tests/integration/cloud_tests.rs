//! Cloud sync task against a scripted cloud port and a controllable link.

use boxmon::app::context::Context;
use boxmon::app::events::AppEvent;
use boxmon::config::SystemConfig;
use boxmon::error::CloudError;
use boxmon::scheduler::{Step, Task};
use boxmon::sensors::readings::SensorReadings;
use boxmon::tasks::CloudSyncTask;
use boxmon::telemetry::Field;

use crate::mock_hw::{CloudCall, MockNetwork, RecordingSink, Rig, ScriptedCloud, SetClock};

struct Harness {
    task: CloudSyncTask,
    ctx: Context,
    cloud: ScriptedCloud,
    network: MockNetwork,
    clock: SetClock,
    sink: RecordingSink,
}

fn harness(config: SystemConfig, network: MockNetwork) -> Harness {
    let cloud = ScriptedCloud::default();
    let clock = SetClock::at(12, 0);
    let sink = RecordingSink::default();
    let (_rig, actuators) = Rig::new();
    let task = CloudSyncTask::new(Box::new(cloud.clone()), &config);
    let ctx = Context::new(
        config,
        actuators,
        Box::new(network.clone()),
        Box::new(clock.clone()),
        Box::new(sink.clone()),
    );
    Harness {
        task,
        ctx,
        cloud,
        network,
        clock,
        sink,
    }
}

#[test]
fn unreachable_host_is_retried_exactly_once() {
    let mut h = harness(SystemConfig::default(), MockNetwork::up());
    h.cloud.script_push(Err(CloudError::HostUnreachable));
    h.cloud.script_push(Err(CloudError::HostUnreachable));

    h.task.run(&mut h.ctx);
    assert_eq!(h.cloud.push_count(), 2);
    assert_eq!(h.network.reconnects.get(), 1);
    assert!(h.sink.contains(&AppEvent::TelemetryDropped(CloudError::HostUnreachable)));

    // Nothing more until the next tick, which pushes once.
    h.task.run(&mut h.ctx);
    assert_eq!(h.cloud.push_count(), 3);
}

#[test]
fn retry_success_reports_two_attempts() {
    let mut h = harness(SystemConfig::default(), MockNetwork::up());
    h.cloud.script_push(Err(CloudError::HostUnreachable));

    h.task.run(&mut h.ctx);
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::TelemetryPushed { attempts: 2, .. })),
        1
    );
}

#[test]
fn out_of_memory_reclaims_before_retrying() {
    let mut h = harness(SystemConfig::default(), MockNetwork::up());
    h.cloud.script_push(Err(CloudError::OutOfMemory));

    h.task.run(&mut h.ctx);
    let calls = h.cloud.calls.borrow();
    assert!(matches!(calls[0], CloudCall::Push(_)));
    assert_eq!(calls[1], CloudCall::Reclaim);
    assert!(matches!(calls[2], CloudCall::Push(_)));
    assert_eq!(h.network.reconnects.get(), 0);
}

#[test]
fn rejected_push_is_not_retried() {
    let mut h = harness(SystemConfig::default(), MockNetwork::up());
    h.cloud.script_push(Err(CloudError::Rejected(503)));

    h.task.run(&mut h.ctx);
    assert_eq!(h.cloud.push_count(), 1);
    assert!(h.sink.contains(&AppEvent::TelemetryDropped(CloudError::Rejected(503))));
}

#[test]
fn malformed_permission_keeps_previous_value() {
    let mut h = harness(SystemConfig::default(), MockNetwork::up());
    h.cloud.script_pull(Ok("abc"));

    h.task.run(&mut h.ctx);
    assert_eq!(h.ctx.permission.try_take(), None);
    assert_eq!(h.sink.count(|e| matches!(e, AppEvent::PermissionChanged { .. })), 0);
    assert!(h.ctx.actuators.pump.as_ref().is_some_and(|p| p.permission()));

    h.cloud.script_pull(Ok("0"));
    h.task.run(&mut h.ctx);
    assert_eq!(h.ctx.permission.try_take(), Some(false));
    assert!(h.sink.contains(&AppEvent::PermissionChanged { granted: false }));
}

#[test]
fn failed_pull_keeps_previous_value() {
    let mut h = harness(SystemConfig::default(), MockNetwork::up());
    h.cloud.script_pull(Err(CloudError::Timeout));

    h.task.run(&mut h.ctx);
    assert_eq!(h.cloud.pull_count(), 1);
    assert_eq!(h.ctx.permission.try_take(), None);
}

#[test]
fn pull_uses_configured_key() {
    let mut config = SystemConfig::default();
    config.cloud.permission_key.clear();
    config.cloud.permission_key.push_str("V7").unwrap();
    let mut h = harness(config, MockNetwork::up());

    h.task.run(&mut h.ctx);
    assert!(h.cloud.calls.borrow().contains(&CloudCall::Pull("V7".into())));
}

#[test]
fn payload_omits_absent_sensors() {
    let mut h = harness(SystemConfig::default(), MockNetwork::up());
    h.ctx.readings = SensorReadings::with_layout(&[0, 1], 2);
    h.ctx.readings.probes[1].celsius = Some(19.5);
    h.ctx.readings.soil[0] = Some(40.0);

    h.task.run(&mut h.ctx);
    let payload = h.cloud.last_payload.borrow().clone().unwrap();
    assert!(!payload.contains(Field::Probe(0)));
    assert!(payload.contains(Field::Probe(1)));
    assert!(payload.contains(Field::Soil(0)));
    assert!(!payload.contains(Field::Soil(1)));
    assert!(!payload.contains(Field::Lux));
    assert!(payload.contains(Field::LowWater));
}

#[test]
fn clock_resynced_only_when_unsynced() {
    let mut h = harness(SystemConfig::default(), MockNetwork::up());
    h.task.run(&mut h.ctx);
    assert_eq!(h.clock.resyncs.get(), 0);

    h.clock.now.set(boxmon::control::schedule::WallClock::UNSYNCED);
    h.task.run(&mut h.ctx);
    assert_eq!(h.clock.resyncs.get(), 1);
}

#[test]
fn repeated_offline_cycles_escalate_to_restart() {
    let mut config = SystemConfig::default();
    config.network.reconnect_attempts = 2;
    let mut h = harness(config, MockNetwork::down());

    assert!(matches!(h.task.run(&mut h.ctx), Step::Sleep(_)));
    assert!(matches!(h.task.run(&mut h.ctx), Step::Sleep(_)));
    assert_eq!(h.task.run(&mut h.ctx), Step::Restart("network unrecoverable"));
    assert!(h.sink.contains(&AppEvent::NetworkLost { consecutive: 3 }));
    assert_eq!(h.cloud.pull_count(), 0);
}

#[test]
fn successful_reconnect_resets_the_count() {
    let mut config = SystemConfig::default();
    config.network.reconnect_attempts = 1;
    let mut h = harness(config, MockNetwork::down());

    assert!(matches!(h.task.run(&mut h.ctx), Step::Sleep(_)));
    h.network.reconnect_succeeds.set(true);
    assert!(matches!(h.task.run(&mut h.ctx), Step::Sleep(_)));

    h.network.connected.set(false);
    h.network.reconnect_succeeds.set(false);
    assert!(matches!(h.task.run(&mut h.ctx), Step::Sleep(_)));
    assert!(h.sink.contains(&AppEvent::NetworkLost { consecutive: 1 }));
    assert_eq!(h.sink.count(|e| matches!(e, AppEvent::NetworkLost { consecutive: 2 })), 0);
}

#[test]
fn offline_cycle_reconnects_at_most_once() {
    let mut h = harness(SystemConfig::default(), MockNetwork::down());
    h.cloud.script_push(Err(CloudError::HostUnreachable));
    h.cloud.script_push(Err(CloudError::HostUnreachable));

    assert!(matches!(h.task.run(&mut h.ctx), Step::Sleep(_)));
    assert_eq!(h.cloud.push_count(), 2);
    assert_eq!(h.network.reconnects.get(), 1);
    assert!(h.sink.contains(&AppEvent::NetworkLost { consecutive: 1 }));

    // The next cycle's push succeeds, so its only reconnect is the offline one.
    assert!(matches!(h.task.run(&mut h.ctx), Step::Sleep(_)));
    assert_eq!(h.network.reconnects.get(), 2);
    assert!(h.sink.contains(&AppEvent::NetworkLost { consecutive: 2 }));
}
