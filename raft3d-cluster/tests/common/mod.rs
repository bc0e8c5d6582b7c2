//! Common test utilities for raft3d-cluster tests.

use raft3d_cluster::{
    Filament, FleetCommand, FleetStateMachine, JobStatus, PrintJob, RawCommand,
};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber once per test binary. Honors `RUST_LOG`.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Encode a command, panicking on failure.
#[allow(dead_code)]
pub fn encode(cmd: &FleetCommand) -> RawCommand {
    cmd.encode().expect("Failed to encode command")
}

/// Apply a sequence of commands that are all expected to succeed.
#[allow(dead_code)]
pub fn apply_all(sm: &FleetStateMachine, commands: &[FleetCommand]) {
    for cmd in commands {
        sm.apply(encode(cmd).as_bytes())
            .unwrap_or_else(|e| panic!("{} {} failed: {e}", cmd.name(), cmd.entity_id()));
    }
}

/// A fleet of 3 printers, 2 spools and 5 jobs in every status.
#[allow(dead_code)]
pub fn fleet_commands() -> Vec<FleetCommand> {
    vec![
        FleetCommand::add_printer("p1", "Prusa", "MK4"),
        FleetCommand::add_printer("p2", "Bambu", "X1C"),
        FleetCommand::add_printer("p3", "Creality", "K1"),
        FleetCommand::add_filament("f1", "PLA", "white", 1000),
        FleetCommand::AddFilament(Filament {
            id: "f2".into(),
            kind: "PETG".into(),
            color: "blue".into(),
            total_weight: 750,
            remaining_weight: 600,
        }),
        FleetCommand::add_job("j1", "p1", "f1", "/gcode/benchy.gcode", 15),
        FleetCommand::add_job("j2", "p2", "f1", "/gcode/vase.gcode", 120),
        FleetCommand::add_job("j3", "p3", "f2", "/gcode/bracket.gcode", 45),
        FleetCommand::AddJob(PrintJob {
            id: "j4".into(),
            printer_id: "p1".into(),
            filament_id: "f2".into(),
            filepath: "/gcode/gear.gcode".into(),
            weight: 30,
            status: JobStatus::Running,
        }),
        FleetCommand::add_job("j5", "p2", "f1", "/gcode/lid.gcode", 60),
        FleetCommand::update_job_status("j2", JobStatus::Running),
        FleetCommand::update_job_status("j3", JobStatus::Running),
        FleetCommand::update_job_status("j3", JobStatus::Done),
        FleetCommand::update_job_status("j4", JobStatus::Cancelled),
        FleetCommand::update_job_status("j5", JobStatus::Running),
        FleetCommand::update_job_status("j5", JobStatus::Done),
    ]
}

/// A state machine holding [`fleet_commands`].
#[allow(dead_code)]
pub fn populated_machine() -> FleetStateMachine {
    let sm = FleetStateMachine::default();
    apply_all(&sm, &fleet_commands());
    sm
}
