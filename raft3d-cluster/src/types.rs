//! Type definitions for OpenRaft integration.
//!
//! OpenRaft requires a type configuration that specifies all the concrete types
//! used in the Raft implementation. Log entries carry the encoded command bytes
//! untouched; decoding happens in the state machine.

use crate::command::RawCommand;
use crate::state::ClusterResponse;
use openraft::BasicNode;
use std::io::Cursor;

/// Node ID type for the cluster.
pub type ClusterNodeId = u64;

openraft::declare_raft_types!(
    /// OpenRaft type configuration for the fleet.
    pub TypeConfig:
        D = RawCommand,
        R = ClusterResponse,
);

/// Type alias for log entry.
pub type ClusterEntry = openraft::Entry<TypeConfig>;

/// Type alias for log ID.
pub type ClusterLogId = openraft::LogId<ClusterNodeId>;

/// Type alias for stored membership.
pub type ClusterStoredMembership = openraft::StoredMembership<ClusterNodeId, BasicNode>;

/// Type alias for snapshot metadata.
pub type ClusterSnapshotMeta = openraft::SnapshotMeta<ClusterNodeId, BasicNode>;

/// Type alias for snapshot.
pub type ClusterSnapshot = openraft::storage::Snapshot<TypeConfig>;

/// Type alias for storage error.
pub type ClusterStorageError = openraft::StorageError<ClusterNodeId>;
