//! Command application logic.

use crate::command::{FleetCommand, JobStatusUpdate};
use crate::config::{ApplyPolicy, MissingFilamentPolicy};
use crate::entity::{Filament, JobStatus, PrintJob, Printer, is_valid_transition};
use crate::error::{ApplyError, ApplyResult};
use crate::state::store::{EntityKind, EntityStore};

/// Apply a command to the entity store.
///
/// This function is the core of the state machine. Every check runs before
/// the first write, so a rejected command leaves the store untouched.
pub fn apply_command(
    store: &mut EntityStore,
    policy: &ApplyPolicy,
    cmd: FleetCommand,
) -> ApplyResult {
    match cmd {
        FleetCommand::AddPrinter(printer) => apply_add_printer(store, printer),
        FleetCommand::AddFilament(filament) => apply_add_filament(store, filament),
        FleetCommand::AddJob(job) => apply_add_job(store, policy, job),
        FleetCommand::UpdateJob(update) => apply_update_job(store, policy, update),
    }
}

/// Reject empty IDs and IDs that are already stored.
fn check_new_id(store: &EntityStore, kind: EntityKind, id: &str) -> ApplyResult {
    if id.is_empty() {
        return Err(ApplyError::InvalidArgument(format!("{kind} id is required")));
    }
    if store.contains(kind, id) {
        return Err(ApplyError::already_exists(kind.as_str(), id));
    }
    Ok(())
}

fn apply_add_printer(store: &mut EntityStore, printer: Printer) -> ApplyResult {
    check_new_id(store, EntityKind::Printer, &printer.id)?;
    store.put_printer(printer);
    Ok(())
}

fn apply_add_filament(store: &mut EntityStore, filament: Filament) -> ApplyResult {
    check_new_id(store, EntityKind::Filament, &filament.id)?;
    store.put_filament(filament);
    Ok(())
}

fn apply_add_job(
    store: &mut EntityStore,
    policy: &ApplyPolicy,
    mut job: PrintJob,
) -> ApplyResult {
    check_new_id(store, EntityKind::Job, &job.id)?;

    if policy.enforce_job_references {
        if !store.contains(EntityKind::Printer, &job.printer_id) {
            return Err(ApplyError::not_found("printer", &job.printer_id));
        }
        if !store.contains(EntityKind::Filament, &job.filament_id) {
            return Err(ApplyError::not_found("filament", &job.filament_id));
        }
    }

    job.status = JobStatus::Queued;
    store.put_job(job);
    Ok(())
}

fn apply_update_job(
    store: &mut EntityStore,
    policy: &ApplyPolicy,
    update: JobStatusUpdate,
) -> ApplyResult {
    let Some(job) = store.job(&update.id) else {
        return Err(ApplyError::not_found("job", &update.id));
    };

    if !is_valid_transition(job.status, update.status) {
        return Err(ApplyError::FailedPrecondition {
            from: job.status.to_string(),
            to: update.status.to_string(),
        });
    }

    if update.status == JobStatus::Done {
        let filament_id = job.filament_id.clone();
        let weight = job.weight;

        match store.filament_mut(&filament_id) {
            Some(filament) => {
                let remaining = filament.remaining_weight;
                if weight > remaining {
                    tracing::warn!(
                        job_id = %update.id,
                        %filament_id,
                        weight,
                        remaining,
                        "job weighs more than the spool holds, clamping to zero"
                    );
                }
                filament.remaining_weight = remaining.saturating_sub(weight);
                tracing::debug!(
                    %filament_id,
                    from = remaining,
                    to = filament.remaining_weight,
                    "deducted filament for completed job"
                );
            }
            None => match policy.missing_filament {
                MissingFilamentPolicy::Reject => {
                    return Err(ApplyError::not_found("filament", &filament_id));
                }
                MissingFilamentPolicy::Warn => {
                    tracing::warn!(
                        job_id = %update.id,
                        %filament_id,
                        "filament not found, completing job without deduction"
                    );
                }
            },
        }
    }

    if let Some(job) = store.job_mut(&update.id) {
        job.status = update.status;
    }
    Ok(())
}
