//! Raft state machine for the printer fleet.
//!
//! The state machine is the core of the cluster's replicated state. It:
//! - Receives committed log entries (encoded commands)
//! - Applies them deterministically to the entity store
//! - Supports snapshots for log compaction and state transfer
//!
//! ## Module Structure
//!
//! - `types`: Response and stored-snapshot types
//! - `state`: The replicated ClusterState
//! - `apply`: Command application logic
//! - `traits`: OpenRaft trait implementations

mod apply;
mod state;
mod traits;
mod types;

pub use apply::apply_command;
pub use state::ClusterState;
pub use types::{ClusterResponse, StoredSnapshot};

use crate::command::FleetCommand;
use crate::config::{ApplyPolicy, FleetConfig};
use crate::entity::{Filament, PrintJob, Printer};
use crate::error::{ApplyResult, SnapshotError};
use crate::state::snapshot::{decode_snapshot, encode_snapshot};
use crate::state::store::EntityStore;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;

/// The Raft state machine.
///
/// Holds the replicated state behind a single lock: `apply` and `restore`
/// take it exclusively, readers and `snapshot` take it shared. A reader can
/// therefore never see a job marked done whose spool has not been debited.
#[derive(Debug, Default)]
pub struct FleetStateMachine {
    /// Apply-time rules, identical on every node.
    policy: ApplyPolicy,
    /// The replicated state.
    state: RwLock<ClusterState>,
    /// Snapshot index counter.
    snapshot_idx: AtomicU64,
    /// Current snapshot.
    current_snapshot: RwLock<Option<StoredSnapshot>>,
}

impl FleetStateMachine {
    /// Create a state machine with the given apply policy.
    pub fn new(policy: ApplyPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Create a state machine from a node configuration.
    pub fn from_config(config: &FleetConfig) -> Self {
        Self::new(config.apply.clone())
    }

    /// The apply policy in force.
    pub fn policy(&self) -> &ApplyPolicy {
        &self.policy
    }

    /// Apply one committed log entry.
    ///
    /// Must be called once per entry, in log order. A rejected entry is still
    /// consumed; the returned error is the result for that log position.
    pub fn apply(&self, entry: &[u8]) -> ApplyResult {
        let mut state = self.state.write();
        self.apply_entry(&mut state, entry)
    }

    /// Decode and apply one entry against an already locked state.
    fn apply_entry(&self, state: &mut ClusterState, entry: &[u8]) -> ApplyResult {
        let cmd = FleetCommand::decode(entry).inspect_err(|e| {
            tracing::warn!(error = %e, len = entry.len(), "dropping undecodable log entry");
        })?;

        let name = cmd.name();
        let id = cmd.entity_id().to_owned();

        match apply_command(&mut state.store, &self.policy, cmd) {
            Ok(()) => {
                tracing::debug!(command = name, %id, "applied command");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(command = name, %id, error = %e, "command rejected");
                Err(e)
            }
        }
    }

    /// Serialize the whole state into a snapshot image.
    pub fn snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        let state = self.state.read();
        encode_snapshot(&state)
    }

    /// Replace the whole state with a previously produced image.
    ///
    /// Only called at startup or catch-up, never concurrently with `apply`.
    /// On error the current state is kept; the node must not serve.
    pub fn restore(&self, image: &[u8]) -> Result<(), SnapshotError> {
        let restored = decode_snapshot(image).inspect_err(|e| {
            tracing::error!(error = %e, size = image.len(), "failed to restore state machine");
        })?;

        let mut state = self.state.write();
        *state = restored;
        tracing::info!(
            printers = state.store.printer_map().len(),
            filaments = state.store.filament_map().len(),
            jobs = state.store.job_map().len(),
            "restored state machine from snapshot"
        );
        Ok(())
    }

    /// Get a read-only view of the current state.
    ///
    /// Note: this reads the local replica. Hold the guard only for as long
    /// as it takes to copy out what is needed; `apply` waits on it.
    pub fn state(&self) -> RwLockReadGuard<'_, ClusterState> {
        self.state.read()
    }

    /// Get a read-only view of the entity store.
    pub fn store(&self) -> MappedRwLockReadGuard<'_, EntityStore> {
        RwLockReadGuard::map(self.state.read(), |s| &s.store)
    }

    /// Copy out every printer.
    pub fn printers(&self) -> BTreeMap<String, Printer> {
        self.store().printer_map().clone()
    }

    /// Copy out every filament spool.
    pub fn filaments(&self) -> BTreeMap<String, Filament> {
        self.store().filament_map().clone()
    }

    /// Copy out every print job.
    pub fn jobs(&self) -> BTreeMap<String, PrintJob> {
        self.store().job_map().clone()
    }

    /// Look up one printer.
    pub fn printer(&self, id: &str) -> Option<Printer> {
        self.store().printer(id).cloned()
    }

    /// Look up one filament spool.
    pub fn filament(&self, id: &str) -> Option<Filament> {
        self.store().filament(id).cloned()
    }

    /// Look up one print job.
    pub fn job(&self, id: &str) -> Option<PrintJob> {
        self.store().job(id).cloned()
    }
}
