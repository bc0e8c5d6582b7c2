//! Replicated state machine for the Raft3D printer fleet.
//!
//! This crate is the deterministic core that sits behind the consensus log:
//! it decodes committed commands, applies them to an in-memory store of
//! printers, filament spools and print jobs, and checkpoints that store as
//! snapshots. Consensus itself (election, replication, transport) is driven
//! by OpenRaft through the [`RaftStateMachine`](openraft::storage::RaftStateMachine)
//! implementation on `Arc<FleetStateMachine>`.
//!
//! # Architecture
//!
//! ```text
//!   committed entry (bytes)
//!            │
//!   ┌────────▼────────┐     ┌──────────────┐
//!   │  FleetCommand   │     │ is_valid_    │
//!   │  ::decode       │     │ transition   │
//!   └────────┬────────┘     └──────▲───────┘
//!            │                     │
//!   ┌────────▼─────────────────────┴───┐      ┌──────────────┐
//!   │ apply_command (single writer)    ├─────►│ EntityStore  │◄── readers
//!   └──────────────────────────────────┘      └──────┬───────┘   (shared lock)
//!                                                    │
//!                                         snapshot / restore
//! ```
//!
//! # Usage
//!
//! ```
//! use raft3d_cluster::{FleetCommand, FleetStateMachine, JobStatus};
//!
//! let sm = FleetStateMachine::default();
//! let commands = [
//!     FleetCommand::add_filament("f1", "PLA", "white", 1000),
//!     FleetCommand::add_job("j1", "p1", "f1", "/gcode/benchy.gcode", 250),
//!     FleetCommand::update_job_status("j1", JobStatus::Running),
//!     FleetCommand::update_job_status("j1", JobStatus::Done),
//! ];
//! for cmd in commands {
//!     sm.apply(cmd.encode()?.as_bytes())?;
//! }
//! assert_eq!(sm.filament("f1").map(|f| f.remaining_weight), Some(750));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod command;
pub mod config;
pub mod entity;
pub mod error;
pub mod state;
pub mod types;

// Re-export main types
pub use command::{CommandEnvelope, CommandKind, FleetCommand, JobStatusUpdate, RawCommand};
pub use config::{ApplyPolicy, FleetConfig, MissingFilamentPolicy};
pub use entity::{Filament, JobStatus, PrintJob, Printer, is_valid_transition};
pub use error::{ApplyError, ApplyResult, ClusterError, ClusterResult, SnapshotError};
pub use state::{ClusterResponse, ClusterState, EntityKind, EntityStore, FleetStateMachine};
pub use types::{ClusterNodeId, TypeConfig};
