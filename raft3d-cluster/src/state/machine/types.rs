//! Types for cluster state management.

use crate::error::{ApplyError, ApplyResult};
use crate::types::ClusterSnapshotMeta;
use serde::{Deserialize, Serialize};

/// Response from applying a command to the state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterResponse {
    /// Whether the command was applied.
    pub success: bool,
    /// Why the command was rejected.
    pub error: Option<ApplyError>,
}

impl ClusterResponse {
    /// Create a success response.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: ApplyError) -> Self {
        Self {
            success: false,
            error: Some(error),
        }
    }

    /// Convert back into the apply result it was built from.
    pub fn into_result(self) -> ApplyResult {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl From<ApplyResult> for ClusterResponse {
    fn from(result: ApplyResult) -> Self {
        match result {
            Ok(()) => ClusterResponse::ok(),
            Err(e) => ClusterResponse::err(e),
        }
    }
}

/// Stored snapshot data.
#[derive(Debug)]
pub struct StoredSnapshot {
    /// Snapshot metadata.
    pub meta: ClusterSnapshotMeta,
    /// Serialized state image.
    pub data: Vec<u8>,
}
