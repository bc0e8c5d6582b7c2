//! OpenRaft storage traits for the fleet state machine.
//!
//! The adapter is thin: normal entries go through the same decode-and-apply
//! path as [`FleetStateMachine::apply`], and snapshots use the versioned image
//! from `state::snapshot`. Raft bookkeeping (last applied log, membership)
//! rides along in [`ClusterState`](super::ClusterState).

use crate::state::snapshot::{decode_snapshot, encode_snapshot};
use crate::types::{
    ClusterLogId, ClusterSnapshot, ClusterSnapshotMeta, ClusterStorageError,
    ClusterStoredMembership, TypeConfig,
};
use openraft::storage::RaftStateMachine;
use openraft::{
    EntryPayload, RaftSnapshotBuilder, RaftTypeConfig, StorageIOError, StoredMembership,
};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use super::FleetStateMachine;
use super::types::{ClusterResponse, StoredSnapshot};

type SnapshotData = <TypeConfig as RaftTypeConfig>::SnapshotData;

/// Snapshot ids are `{leader}-{index}-{seq}`, or `--{seq}` before any entry
/// has been applied.
fn snapshot_id(last_applied: Option<ClusterLogId>, seq: u64) -> String {
    match last_applied {
        Some(log_id) => format!("{}-{}-{}", log_id.leader_id, log_id.index, seq),
        None => format!("--{seq}"),
    }
}

impl RaftSnapshotBuilder<TypeConfig> for Arc<FleetStateMachine> {
    async fn build_snapshot(&mut self) -> Result<ClusterSnapshot, ClusterStorageError> {
        let state = self.state.read();
        let data = encode_snapshot(&state).map_err(|e| StorageIOError::read_state_machine(&e))?;
        let last_log_id = state.last_applied_log;
        let last_membership = state.last_membership.clone();

        // The stored snapshot must match the image, so take its slot before
        // apply can move the state on.
        let mut current = self.current_snapshot.write();
        drop(state);

        let seq = self.snapshot_idx.fetch_add(1, Ordering::Relaxed) + 1;
        let meta = ClusterSnapshotMeta {
            last_log_id,
            last_membership,
            snapshot_id: snapshot_id(last_log_id, seq),
        };

        tracing::info!(
            snapshot_id = %meta.snapshot_id,
            size = data.len(),
            "built fleet snapshot"
        );

        *current = Some(StoredSnapshot {
            meta: meta.clone(),
            data: data.clone(),
        });

        Ok(ClusterSnapshot {
            meta,
            snapshot: Box::new(Cursor::new(data)),
        })
    }
}

/// Every entry yields exactly one response, rejected commands included.
/// Blank and membership entries only move the bookkeeping forward.
impl RaftStateMachine<TypeConfig> for Arc<FleetStateMachine> {
    type SnapshotBuilder = Self;

    async fn applied_state(
        &mut self,
    ) -> Result<(Option<ClusterLogId>, ClusterStoredMembership), ClusterStorageError> {
        let state = self.state.read();
        Ok((state.last_applied_log, state.last_membership.clone()))
    }

    async fn apply<I>(&mut self, entries: I) -> Result<Vec<ClusterResponse>, ClusterStorageError>
    where
        I: IntoIterator<Item = openraft::Entry<TypeConfig>> + Send,
    {
        let mut state = self.state.write();

        let responses = entries
            .into_iter()
            .map(|entry| {
                tracing::trace!(log_id = %entry.log_id, "applying raft entry");
                state.last_applied_log = Some(entry.log_id);

                match entry.payload {
                    EntryPayload::Blank => ClusterResponse::ok(),
                    EntryPayload::Normal(raw) => {
                        ClusterResponse::from(self.apply_entry(&mut state, raw.as_bytes()))
                    }
                    EntryPayload::Membership(membership) => {
                        state.last_membership =
                            StoredMembership::new(Some(entry.log_id), membership);
                        ClusterResponse::ok()
                    }
                }
            })
            .collect();

        Ok(responses)
    }

    async fn get_snapshot_builder(&mut self) -> Self::SnapshotBuilder {
        Arc::clone(self)
    }

    async fn begin_receiving_snapshot(&mut self) -> Result<Box<SnapshotData>, ClusterStorageError> {
        Ok(Box::new(Cursor::new(Vec::new())))
    }

    async fn install_snapshot(
        &mut self,
        meta: &ClusterSnapshotMeta,
        snapshot: Box<SnapshotData>,
    ) -> Result<(), ClusterStorageError> {
        let data = snapshot.into_inner();

        let mut restored = decode_snapshot(&data).map_err(|e| {
            tracing::error!(
                snapshot_id = %meta.snapshot_id,
                size = data.len(),
                error = %e,
                "refusing fleet snapshot from leader"
            );
            StorageIOError::read_snapshot(Some(meta.signature()), &e)
        })?;
        restored.last_applied_log = meta.last_log_id;
        restored.last_membership = meta.last_membership.clone();

        let mut state = self.state.write();
        *state = restored;
        let mut current = self.current_snapshot.write();
        drop(state);

        tracing::info!(
            snapshot_id = %meta.snapshot_id,
            size = data.len(),
            "installed fleet snapshot"
        );
        *current = Some(StoredSnapshot {
            meta: meta.clone(),
            data,
        });
        Ok(())
    }

    async fn get_current_snapshot(
        &mut self,
    ) -> Result<Option<ClusterSnapshot>, ClusterStorageError> {
        let current = self.current_snapshot.read();
        Ok(current.as_ref().map(|stored| ClusterSnapshot {
            meta: stored.meta.clone(),
            snapshot: Box::new(Cursor::new(stored.data.clone())),
        }))
    }
}
