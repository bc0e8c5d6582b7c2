//! Fleet entities: printers, filament spools and print jobs.
//!
//! These are the records held by the replicated store and carried inside
//! command payloads. Field names on the wire follow the Raft3D REST API
//! (`total_weight_in_grams`, ...); the short names are accepted as aliases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 3D printer registered with the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Printer {
    /// Externally supplied unique identifier.
    pub id: String,
    /// Manufacturer.
    pub company: String,
    /// Printer model.
    pub model: String,
}

/// A filament spool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filament {
    /// Externally supplied unique identifier.
    pub id: String,
    /// Material, e.g. `PLA` or `PETG`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-text color.
    pub color: String,
    /// Spool weight at creation, in grams.
    #[serde(rename = "total_weight_in_grams", alias = "total_weight")]
    pub total_weight: u64,
    /// Weight still on the spool, in grams. Only ever decreases.
    #[serde(rename = "remaining_weight_in_grams", alias = "remaining_weight")]
    pub remaining_weight: u64,
}

/// A print job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJob {
    /// Externally supplied unique identifier.
    pub id: String,
    /// Printer the job runs on.
    #[serde(default)]
    pub printer_id: String,
    /// Spool the job consumes.
    #[serde(default)]
    pub filament_id: String,
    /// Path of the sliced model file. Opaque to the state machine.
    #[serde(default)]
    pub filepath: String,
    /// Filament consumed when the job completes, in grams.
    #[serde(rename = "print_weight_in_grams", alias = "weight")]
    pub weight: u64,
    /// Lifecycle status. Always `Queued` once stored by `AddJob`.
    #[serde(default)]
    pub status: JobStatus,
}

/// Lifecycle status of a print job.
///
/// ```text
/// Queued ──► Running ──► Done
///    │          │
///    └──────────┴──────► Cancelled
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    /// Waiting for a printer.
    #[default]
    Queued,
    /// Printing.
    Running,
    /// Finished; filament has been deducted.
    Done,
    /// Abandoned before completion.
    Cancelled,
}

impl JobStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Queued,
        JobStatus::Running,
        JobStatus::Done,
        JobStatus::Cancelled,
    ];

    /// Get the wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "Queued",
            JobStatus::Running => "Running",
            JobStatus::Done => "Done",
            JobStatus::Cancelled => "Cancelled",
        }
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Cancelled)
    }

    /// Check whether a job in this status may move to `requested`.
    pub fn can_transition_to(self, requested: JobStatus) -> bool {
        is_valid_transition(self, requested)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide whether a job status change is legal.
///
/// Jobs go `Queued -> Running -> Done`, and may be `Cancelled` from `Queued`
/// or `Running`. Nothing leaves `Done` or `Cancelled`, nothing goes back to
/// `Queued`, and re-stating the current status is rejected.
pub fn is_valid_transition(current: JobStatus, requested: JobStatus) -> bool {
    use JobStatus::*;

    matches!(
        (current, requested),
        (Queued, Running) | (Queued, Cancelled) | (Running, Done) | (Running, Cancelled)
    )
}
