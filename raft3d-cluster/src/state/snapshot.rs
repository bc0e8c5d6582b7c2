//! Versioned state images.
//!
//! A snapshot is a self-describing JSON document:
//!
//! ```text
//! {"format":"raft3d.fleet_state","version":1,"state":{...}}
//! ```
//!
//! The header is checked before the state is decoded so that an image from a
//! different build is refused instead of being half-understood.

use crate::error::SnapshotError;
use crate::state::machine::ClusterState;
use crate::state::store::{EntityKind, EntityStore};
use serde::{Deserialize, Serialize};

/// Format identifier written into every image.
pub const SNAPSHOT_FORMAT: &str = "raft3d.fleet_state";

/// Image layout version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotImageRef<'a> {
    format: &'a str,
    version: u32,
    state: &'a ClusterState,
}

#[derive(Deserialize)]
struct SnapshotImage {
    format: String,
    version: u32,
    state: serde_json::Value,
}

/// Serialize a state into a snapshot image.
pub fn encode_snapshot(state: &ClusterState) -> Result<Vec<u8>, SnapshotError> {
    let image = SnapshotImageRef {
        format: SNAPSHOT_FORMAT,
        version: SNAPSHOT_VERSION,
        state,
    };
    serde_json::to_vec(&image).map_err(|e| SnapshotError::Encode(e.to_string()))
}

/// Parse a snapshot image back into a state.
pub fn decode_snapshot(bytes: &[u8]) -> Result<ClusterState, SnapshotError> {
    let image: SnapshotImage =
        serde_json::from_slice(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))?;

    if image.format != SNAPSHOT_FORMAT {
        return Err(SnapshotError::UnsupportedFormat(image.format));
    }
    if image.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: image.version,
            expected: SNAPSHOT_VERSION,
        });
    }

    let state: ClusterState =
        serde_json::from_value(image.state).map_err(|e| SnapshotError::Decode(e.to_string()))?;
    check_keys(&state.store)?;
    Ok(state)
}

/// Every entity must be stored under its own id.
fn check_keys(store: &EntityStore) -> Result<(), SnapshotError> {
    let mismatch = store
        .printers()
        .map(|(key, p)| (EntityKind::Printer, key, p.id.as_str()))
        .chain(
            store
                .filaments()
                .map(|(key, f)| (EntityKind::Filament, key, f.id.as_str())),
        )
        .chain(store.jobs().map(|(key, j)| (EntityKind::Job, key, j.id.as_str())))
        .find(|(_, key, id)| key != id);

    match mismatch {
        Some((kind, key, id)) => Err(SnapshotError::Decode(format!(
            "{kind} stored under key {key:?} has id {id:?}"
        ))),
        None => Ok(()),
    }
}
