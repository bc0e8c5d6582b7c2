//! Fleet commands - operations that go through Raft consensus.
//!
//! Every mutation of the fleet is a [`FleetCommand`]. Commands travel through
//! the log as an envelope of `{ "kind": ..., "payload": ... }` where the
//! payload holds the kind-specific entity fields:
//!
//! ```text
//! {"kind":"add_job","payload":{"id":"j1","filament_id":"f1","print_weight_in_grams":250}}
//! ```
//!
//! The log itself only ever stores the encoded bytes ([`RawCommand`]); the
//! state machine decodes them at apply time so that a malformed entry is a
//! reported no-op rather than a failure of the consensus layer.

use crate::entity::{Filament, JobStatus, PrintJob, Printer};
use crate::error::{ApplyError, ClusterResult};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Commands that are replicated through Raft consensus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetCommand {
    /// Register a printer.
    AddPrinter(Printer),
    /// Register a filament spool.
    AddFilament(Filament),
    /// Queue a print job.
    AddJob(PrintJob),
    /// Move a job to a new lifecycle status.
    UpdateJob(JobStatusUpdate),
}

/// Payload of an `update_job` command.
///
/// Extra job fields in the payload are ignored, so a full job record is also
/// accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusUpdate {
    /// Job to update.
    pub id: String,
    /// Requested status.
    pub status: JobStatus,
}

/// Discriminant of a command on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// `add_printer`
    AddPrinter,
    /// `add_filament`
    AddFilament,
    /// `add_job`
    AddJob,
    /// `update_job`
    UpdateJob,
}

impl CommandKind {
    /// Get the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::AddPrinter => "add_printer",
            CommandKind::AddFilament => "add_filament",
            CommandKind::AddJob => "add_job",
            CommandKind::UpdateJob => "update_job",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit committed to the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Which command this is. Older clients send it as `type`.
    #[serde(alias = "type")]
    pub kind: CommandKind,
    /// Kind-specific entity fields, either inline or as base64-encoded JSON.
    pub payload: Value,
}

/// Encoded command bytes exactly as committed to the log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommand(pub Vec<u8>);

impl RawCommand {
    /// Borrow the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RawCommand {
    fn from(bytes: Vec<u8>) -> Self {
        RawCommand(bytes)
    }
}

impl FleetCommand {
    /// Build an `add_printer` command.
    pub fn add_printer(
        id: impl Into<String>,
        company: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        FleetCommand::AddPrinter(Printer {
            id: id.into(),
            company: company.into(),
            model: model.into(),
        })
    }

    /// Build an `add_filament` command for a full spool.
    pub fn add_filament(
        id: impl Into<String>,
        kind: impl Into<String>,
        color: impl Into<String>,
        total_weight: u64,
    ) -> Self {
        FleetCommand::AddFilament(Filament {
            id: id.into(),
            kind: kind.into(),
            color: color.into(),
            total_weight,
            remaining_weight: total_weight,
        })
    }

    /// Build an `add_job` command.
    pub fn add_job(
        id: impl Into<String>,
        printer_id: impl Into<String>,
        filament_id: impl Into<String>,
        filepath: impl Into<String>,
        weight: u64,
    ) -> Self {
        FleetCommand::AddJob(PrintJob {
            id: id.into(),
            printer_id: printer_id.into(),
            filament_id: filament_id.into(),
            filepath: filepath.into(),
            weight,
            status: JobStatus::Queued,
        })
    }

    /// Build an `update_job` command.
    pub fn update_job_status(id: impl Into<String>, status: JobStatus) -> Self {
        FleetCommand::UpdateJob(JobStatusUpdate {
            id: id.into(),
            status,
        })
    }

    /// Get the wire kind of this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            FleetCommand::AddPrinter(_) => CommandKind::AddPrinter,
            FleetCommand::AddFilament(_) => CommandKind::AddFilament,
            FleetCommand::AddJob(_) => CommandKind::AddJob,
            FleetCommand::UpdateJob(_) => CommandKind::UpdateJob,
        }
    }

    /// Get a human-readable name for this command type.
    pub fn name(&self) -> &'static str {
        match self {
            FleetCommand::AddPrinter(_) => "AddPrinter",
            FleetCommand::AddFilament(_) => "AddFilament",
            FleetCommand::AddJob(_) => "AddJob",
            FleetCommand::UpdateJob(_) => "UpdateJob",
        }
    }

    /// Get the ID of the entity this command creates or updates.
    pub fn entity_id(&self) -> &str {
        match self {
            FleetCommand::AddPrinter(p) => &p.id,
            FleetCommand::AddFilament(f) => &f.id,
            FleetCommand::AddJob(j) => &j.id,
            FleetCommand::UpdateJob(u) => &u.id,
        }
    }

    /// Wrap this command in its wire envelope.
    pub fn to_envelope(&self) -> ClusterResult<CommandEnvelope> {
        let payload = match self {
            FleetCommand::AddPrinter(p) => serde_json::to_value(p)?,
            FleetCommand::AddFilament(f) => serde_json::to_value(f)?,
            FleetCommand::AddJob(j) => serde_json::to_value(j)?,
            FleetCommand::UpdateJob(u) => serde_json::to_value(u)?,
        };
        Ok(CommandEnvelope {
            kind: self.kind(),
            payload,
        })
    }

    /// Encode this command into the bytes committed to the log.
    pub fn encode(&self) -> ClusterResult<RawCommand> {
        let envelope = self.to_envelope()?;
        Ok(RawCommand(serde_json::to_vec(&envelope)?))
    }

    /// Decode a committed log entry.
    ///
    /// Never panics; malformed bytes, an unknown kind or a payload that does
    /// not match the kind all yield [`ApplyError::Decode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, ApplyError> {
        let envelope: CommandEnvelope = serde_json::from_slice(bytes)?;
        Self::from_envelope(envelope)
    }

    /// Interpret an envelope's payload according to its kind.
    ///
    /// The payload may also be a base64 string holding the JSON object, which
    /// is how older clients serialize raw payload bytes. A status supplied
    /// with `add_job` is dropped, since new jobs always start out queued.
    pub fn from_envelope(envelope: CommandEnvelope) -> Result<Self, ApplyError> {
        let CommandEnvelope { kind, payload } = envelope;
        let mut payload = unwrap_payload(payload)?;
        let cmd = match kind {
            CommandKind::AddPrinter => FleetCommand::AddPrinter(serde_json::from_value(payload)?),
            CommandKind::AddFilament => {
                FleetCommand::AddFilament(serde_json::from_value(payload)?)
            }
            CommandKind::AddJob => {
                if let Some(fields) = payload.as_object_mut() {
                    fields.remove("status");
                }
                FleetCommand::AddJob(serde_json::from_value(payload)?)
            }
            CommandKind::UpdateJob => FleetCommand::UpdateJob(serde_json::from_value(payload)?),
        };
        Ok(cmd)
    }
}

/// Turn a base64 string payload into the JSON value it encodes.
fn unwrap_payload(payload: Value) -> Result<Value, ApplyError> {
    match payload {
        Value::String(encoded) => {
            let bytes = STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| ApplyError::Decode(format!("payload is not valid base64: {e}")))?;
            Ok(serde_json::from_slice(&bytes)?)
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_is_identity() {
        let commands = [
            FleetCommand::add_printer("p1", "Prusa", "MK4"),
            FleetCommand::AddFilament(Filament {
                id: "f1".into(),
                kind: "PETG".into(),
                color: "black".into(),
                total_weight: 1000,
                remaining_weight: 640,
            }),
            FleetCommand::add_job("j1", "p1", "f1", "/gcode/benchy.gcode", 30),
            FleetCommand::update_job_status("j1", JobStatus::Cancelled),
        ];

        for cmd in commands {
            let raw = cmd.encode().unwrap();
            assert_eq!(FleetCommand::decode(raw.as_bytes()).unwrap(), cmd);
        }
    }

    #[test]
    fn decodes_documented_wire_format() {
        let bytes = br#"{"kind":"add_filament","payload":{"id":"f1","type":"PLA","color":"white","total_weight":1000,"remaining_weight":1000}}"#;
        let cmd = FleetCommand::decode(bytes).unwrap();

        assert_eq!(cmd.kind(), CommandKind::AddFilament);
        assert_eq!(cmd.entity_id(), "f1");
    }

    #[test]
    fn accepts_legacy_type_key() {
        let bytes = br#"{"type":"update_job","payload":{"id":"j1","status":"Running"}}"#;
        assert_eq!(
            FleetCommand::decode(bytes).unwrap(),
            FleetCommand::update_job_status("j1", JobStatus::Running)
        );
    }

    #[test]
    fn decodes_base64_payload() {
        let bytes = br#"{"type":"add_printer","payload":"eyJpZCI6InAxIiwiY29tcGFueSI6IlBydXNhIiwibW9kZWwiOiJNSzQifQ=="}"#;
        assert_eq!(
            FleetCommand::decode(bytes).unwrap(),
            FleetCommand::add_printer("p1", "Prusa", "MK4")
        );
    }

    #[test]
    fn base64_job_with_empty_status_is_queued() {
        // {"id":"j1","printer_id":"p1","filament_id":"f1","filepath":"cube.gcode",
        //  "print_weight_in_grams":40,"status":""}
        let bytes = br#"{"type":"add_job","payload":"eyJpZCI6ImoxIiwicHJpbnRlcl9pZCI6InAxIiwiZmlsYW1lbnRfaWQiOiJmMSIsImZpbGVwYXRoIjoiY3ViZS5nY29kZSIsInByaW50X3dlaWdodF9pbl9ncmFtcyI6NDAsInN0YXR1cyI6IiJ9"}"#;
        assert_eq!(
            FleetCommand::decode(bytes).unwrap(),
            FleetCommand::add_job("j1", "p1", "f1", "cube.gcode", 40)
        );
    }

    #[test]
    fn add_job_ignores_supplied_status() {
        let payloads = [
            r#"{"id":"j1","filament_id":"f1","weight":40,"status":""}"#,
            r#"{"id":"j1","filament_id":"f1","weight":40,"status":"Printing"}"#,
            r#"{"id":"j1","filament_id":"f1","weight":40,"status":null}"#,
            r#"{"id":"j1","filament_id":"f1","weight":40,"status":"Done"}"#,
        ];

        for payload in payloads {
            let bytes = format!(r#"{{"kind":"add_job","payload":{payload}}}"#);
            let Ok(FleetCommand::AddJob(job)) = FleetCommand::decode(bytes.as_bytes()) else {
                panic!("{payload} should decode as add_job");
            };
            assert_eq!(job.status, JobStatus::Queued, "{payload}");
        }
    }

    #[test]
    fn update_ignores_extra_job_fields() {
        let bytes = br#"{"kind":"update_job","payload":{"id":"j1","printer_id":"","filament_id":"","filepath":"","print_weight_in_grams":0,"status":"Done"}}"#;
        assert_eq!(
            FleetCommand::decode(bytes).unwrap(),
            FleetCommand::update_job_status("j1", JobStatus::Done)
        );
    }

    #[test]
    fn malformed_input_is_a_decode_error() {
        let cases: [&[u8]; 8] = [
            b"",
            b"not json",
            br#"{"kind":"delete_printer","payload":{"id":"p1"}}"#,
            br#"{"kind":"add_printer"}"#,
            br#"{"kind":"add_printer","payload":{"id":"p1"}}"#,
            br#"{"kind":"update_job","payload":{"id":"j1","status":"Paused"}}"#,
            br#"{"kind":"add_printer","payload":"not base64!"}"#,
            br#"{"kind":"add_printer","payload":"bm90IGpzb24="}"#,
        ];

        for bytes in cases {
            assert!(
                matches!(FleetCommand::decode(bytes), Err(ApplyError::Decode(_))),
                "{:?}",
                String::from_utf8_lossy(bytes)
            );
        }
    }
}
