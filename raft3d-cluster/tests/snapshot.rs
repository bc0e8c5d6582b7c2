//! Snapshot and restore tests.

mod common;

use common::{encode, init_tracing, populated_machine};
use raft3d_cluster::{
    EntityKind, FleetCommand, FleetStateMachine, JobStatus, SnapshotError,
    state::{SNAPSHOT_FORMAT, SNAPSHOT_VERSION},
};

#[test]
fn test_restore_reproduces_store() {
    let source = populated_machine();
    let image = source.snapshot().expect("Failed to snapshot");

    let target = FleetStateMachine::default();
    target.restore(&image).expect("Failed to restore");

    let restored = target.store();
    assert_eq!(restored.len(EntityKind::Printer), 3);
    assert_eq!(restored.len(EntityKind::Filament), 2);
    assert_eq!(restored.len(EntityKind::Job), 5);
    assert_eq!(*restored, *source.store());

    assert_eq!(target.job("j4").unwrap().status, JobStatus::Cancelled);
    assert_eq!(target.filament("f2").unwrap().remaining_weight, 555);
}

#[test]
fn test_restored_machine_keeps_applying() {
    let source = populated_machine();
    let target = FleetStateMachine::default();
    target.restore(&source.snapshot().unwrap()).unwrap();

    let next = [
        FleetCommand::update_job_status("j2", JobStatus::Done),
        FleetCommand::add_printer("p1", "dup", "dup"),
    ];
    for cmd in &next {
        let raw = encode(cmd);
        assert_eq!(source.apply(raw.as_bytes()), target.apply(raw.as_bytes()));
    }

    assert_eq!(*source.store(), *target.store());
    assert_eq!(target.filament("f1").unwrap().remaining_weight, 820);
}

#[test]
fn test_restore_replaces_existing_state() {
    let sm = FleetStateMachine::default();
    let empty_image = sm.snapshot().unwrap();

    common::apply_all(&sm, &[FleetCommand::add_printer("stale", "Prusa", "MINI")]);
    sm.restore(&empty_image).unwrap();

    assert!(sm.printer("stale").is_none());
    assert!(sm.store().is_empty());
}

#[test]
fn test_failed_restore_keeps_state() {
    init_tracing();
    let sm = populated_machine();
    let before = sm.snapshot().unwrap();

    let truncated = &before[..before.len() / 2];
    assert!(matches!(sm.restore(truncated), Err(SnapshotError::Decode(_))));

    let future = format!(
        r#"{{"format":"{SNAPSHOT_FORMAT}","version":{},"state":{{}}}}"#,
        SNAPSHOT_VERSION + 1
    );
    assert!(matches!(
        sm.restore(future.as_bytes()),
        Err(SnapshotError::UnsupportedVersion { .. })
    ));

    assert_eq!(sm.snapshot().unwrap(), before);
}
