//! Error types for the fleet state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for crate-level operations.
pub type ClusterResult<T> = std::result::Result<T, ClusterError>;

/// Outcome of applying one committed log entry.
pub type ApplyResult = std::result::Result<(), ApplyError>;

/// Why a committed command was not applied.
///
/// A rejected command is still consumed: its log position counts as applied
/// and the store is left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ApplyError {
    /// The entry bytes are not a well-formed command.
    #[error("malformed command: {0}")]
    Decode(String),

    /// A required field is missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An entity with the same ID is already stored.
    #[error("{kind} {id} already exists")]
    AlreadyExists {
        /// Entity kind (`printer`, `filament`, `job`).
        kind: String,
        /// The duplicate ID.
        id: String,
    },

    /// The command refers to an entity that is not stored.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind (`printer`, `filament`, `job`).
        kind: String,
        /// The missing ID.
        id: String,
    },

    /// The job lifecycle forbids the requested status change.
    #[error("invalid status transition from {from} to {to}")]
    FailedPrecondition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },
}

impl ApplyError {
    pub(crate) fn already_exists(kind: &str, id: &str) -> Self {
        ApplyError::AlreadyExists {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn not_found(kind: &str, id: &str) -> Self {
        ApplyError::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApplyError {
    fn from(e: serde_json::Error) -> Self {
        ApplyError::Decode(e.to_string())
    }
}

/// Errors producing or restoring a state image.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The state could not be serialized.
    #[error("failed to encode snapshot: {0}")]
    Encode(String),

    /// The image bytes are malformed.
    #[error("failed to decode snapshot: {0}")]
    Decode(String),

    /// The image was produced by something other than this state machine.
    #[error("unsupported snapshot format {0:?}")]
    UnsupportedFormat(String),

    /// The image was written by an incompatible version.
    #[error("unsupported snapshot version {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version found in the image.
        found: u32,
        /// Version this build writes.
        expected: u32,
    },
}

/// Crate-level errors.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ClusterError {
    fn from(e: serde_json::Error) -> Self {
        ClusterError::Serialization(e.to_string())
    }
}
