//! Node configuration.
//!
//! Everything under [`ApplyPolicy`] changes how commands are applied and must
//! therefore be identical on every node of a cluster; the raft and snapshot
//! sections may differ between nodes.

use crate::error::{ClusterError, ClusterResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a fleet node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// This node's unique ID in the cluster (1-based).
    pub node_id: u64,

    /// Cluster name reported to the consensus layer.
    pub cluster_name: String,

    /// Raft timing configuration.
    pub raft: RaftConfig,

    /// Snapshot configuration.
    pub snapshot: SnapshotConfig,

    /// How commands are applied.
    pub apply: ApplyPolicy,
}

/// Raft timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaftConfig {
    /// Election timeout range (min, max) in milliseconds.
    pub election_timeout_ms: (u64, u64),

    /// Heartbeat interval in milliseconds.
    pub heartbeat_interval_ms: u64,

    /// Maximum entries per AppendEntries RPC.
    pub max_entries_per_append: u64,
}

/// Snapshot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Create snapshot after this many log entries.
    pub snapshot_threshold: u64,

    /// Maximum number of log entries to keep after snapshot.
    pub max_log_entries: u64,
}

/// What to do when a job completes against a spool that is not stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFilamentPolicy {
    /// Fail the update with `NotFound`; the job keeps its status.
    #[default]
    Reject,
    /// Mark the job done without deducting anything and log a warning.
    Warn,
}

/// Apply-time rules. Must match across the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyPolicy {
    /// Completion against an unknown spool.
    pub missing_filament: MissingFilamentPolicy,

    /// Reject `AddJob` when its printer or filament is not stored.
    pub enforce_job_references: bool,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            node_id: 1,
            cluster_name: "raft3d".to_string(),
            raft: RaftConfig::default(),
            snapshot: SnapshotConfig::default(),
            apply: ApplyPolicy::default(),
        }
    }
}

impl Default for RaftConfig {
    fn default() -> Self {
        Self {
            election_timeout_ms: (150, 300),
            heartbeat_interval_ms: 50,
            max_entries_per_append: 300,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            snapshot_threshold: 5_000,
            max_log_entries: 1_000,
        }
    }
}

impl FleetConfig {
    /// Create a new configuration builder.
    pub fn builder() -> FleetConfigBuilder {
        FleetConfigBuilder::default()
    }

    /// Get the election timeout as a Duration range.
    pub fn election_timeout(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.raft.election_timeout_ms.0),
            Duration::from_millis(self.raft.election_timeout_ms.1),
        )
    }

    /// Get the heartbeat interval as a Duration.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.raft.heartbeat_interval_ms)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ClusterResult<()> {
        if self.node_id == 0 {
            return Err(ClusterError::Config("node_id must be > 0".to_string()));
        }

        if self.cluster_name.is_empty() {
            return Err(ClusterError::Config("cluster_name is required".to_string()));
        }

        let (min_election, max_election) = self.raft.election_timeout_ms;
        if min_election >= max_election {
            return Err(ClusterError::Config(format!(
                "election_timeout_ms ({min_election}, {max_election}) must be an increasing range"
            )));
        }

        if self.raft.heartbeat_interval_ms >= min_election / 2 {
            return Err(ClusterError::Config(format!(
                "heartbeat_interval_ms ({}) should be << election_timeout_ms ({})",
                self.raft.heartbeat_interval_ms, min_election
            )));
        }

        if self.snapshot.snapshot_threshold == 0 {
            return Err(ClusterError::Config(
                "snapshot_threshold must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the validated OpenRaft configuration for this node.
    pub fn raft_config(&self) -> ClusterResult<openraft::Config> {
        self.validate()?;

        let config = openraft::Config {
            cluster_name: self.cluster_name.clone(),
            election_timeout_min: self.raft.election_timeout_ms.0,
            election_timeout_max: self.raft.election_timeout_ms.1,
            heartbeat_interval: self.raft.heartbeat_interval_ms,
            max_payload_entries: self.raft.max_entries_per_append,
            snapshot_policy: openraft::SnapshotPolicy::LogsSinceLast(
                self.snapshot.snapshot_threshold,
            ),
            max_in_snapshot_log_to_keep: self.snapshot.max_log_entries,
            ..Default::default()
        };

        config
            .validate()
            .map_err(|e| ClusterError::Config(e.to_string()))
    }
}

/// Builder for FleetConfig.
#[derive(Debug, Default)]
pub struct FleetConfigBuilder {
    config: FleetConfig,
}

impl FleetConfigBuilder {
    /// Set the node ID.
    pub fn node_id(mut self, id: u64) -> Self {
        self.config.node_id = id;
        self
    }

    /// Set the cluster name.
    pub fn cluster_name(mut self, name: impl Into<String>) -> Self {
        self.config.cluster_name = name.into();
        self
    }

    /// Set election timeout range in milliseconds.
    pub fn election_timeout_ms(mut self, min: u64, max: u64) -> Self {
        self.config.raft.election_timeout_ms = (min, max);
        self
    }

    /// Set heartbeat interval in milliseconds.
    pub fn heartbeat_interval_ms(mut self, ms: u64) -> Self {
        self.config.raft.heartbeat_interval_ms = ms;
        self
    }

    /// Set snapshot threshold.
    pub fn snapshot_threshold(mut self, entries: u64) -> Self {
        self.config.snapshot.snapshot_threshold = entries;
        self
    }

    /// Set the policy for jobs completing against an unknown spool.
    pub fn missing_filament(mut self, policy: MissingFilamentPolicy) -> Self {
        self.config.apply.missing_filament = policy;
        self
    }

    /// Require jobs to reference stored printers and filaments.
    pub fn enforce_job_references(mut self, enforce: bool) -> Self {
        self.config.apply.enforce_job_references = enforce;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClusterResult<FleetConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
