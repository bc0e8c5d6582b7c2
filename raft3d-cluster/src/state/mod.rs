//! Raft state machine implementation.
//!
//! The state machine receives committed log entries (encoded fleet commands)
//! and applies them to the entity store. All nodes apply the same commands in
//! the same order, ensuring identical state.

mod machine;
mod snapshot;
mod store;

pub use machine::{
    ClusterResponse, ClusterState, FleetStateMachine, StoredSnapshot, apply_command,
};
pub use snapshot::{SNAPSHOT_FORMAT, SNAPSHOT_VERSION, decode_snapshot, encode_snapshot};
pub use store::{EntityKind, EntityStore};
