//! Replicated cluster state.

use crate::state::store::EntityStore;
use crate::types::{ClusterLogId, ClusterStoredMembership};
use serde::{Deserialize, Serialize};

/// The cluster state that gets replicated and snapshotted.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ClusterState {
    /// Printers, filaments and jobs.
    pub store: EntityStore,
    /// Last applied log ID. Only maintained when driven by Raft.
    pub last_applied_log: Option<ClusterLogId>,
    /// Last membership configuration.
    pub last_membership: ClusterStoredMembership,
}
