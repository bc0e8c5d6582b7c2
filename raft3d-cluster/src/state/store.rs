//! In-memory entity store.

use crate::entity::{Filament, PrintJob, Printer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The three kinds of entity held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// [`Printer`]
    Printer,
    /// [`Filament`]
    Filament,
    /// [`PrintJob`]
    Job,
}

impl EntityKind {
    /// Get the name used in errors and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Printer => "printer",
            EntityKind::Filament => "filament",
            EntityKind::Job => "job",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Printers, filaments and jobs keyed by ID.
///
/// Maps are ordered so that iteration and serialized images are identical on
/// every replica. Writes are crate-internal: only the apply engine and
/// restore mutate a store.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStore {
    printers: BTreeMap<String, Printer>,
    filaments: BTreeMap<String, Filament>,
    jobs: BTreeMap<String, PrintJob>,
}

impl EntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a printer.
    pub fn printer(&self, id: &str) -> Option<&Printer> {
        self.printers.get(id)
    }

    /// Look up a filament spool.
    pub fn filament(&self, id: &str) -> Option<&Filament> {
        self.filaments.get(id)
    }

    /// Look up a print job.
    pub fn job(&self, id: &str) -> Option<&PrintJob> {
        self.jobs.get(id)
    }

    /// Check whether an entity of the given kind is stored under `id`.
    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::Printer => self.printers.contains_key(id),
            EntityKind::Filament => self.filaments.contains_key(id),
            EntityKind::Job => self.jobs.contains_key(id),
        }
    }

    /// Number of stored entities of the given kind.
    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Printer => self.printers.len(),
            EntityKind::Filament => self.filaments.len(),
            EntityKind::Job => self.jobs.len(),
        }
    }

    /// True if no entity of any kind is stored.
    pub fn is_empty(&self) -> bool {
        self.printers.is_empty() && self.filaments.is_empty() && self.jobs.is_empty()
    }

    /// Iterate printers in ID order.
    pub fn printers(&self) -> impl Iterator<Item = (&str, &Printer)> {
        self.printers.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate filament spools in ID order.
    pub fn filaments(&self) -> impl Iterator<Item = (&str, &Filament)> {
        self.filaments.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate print jobs in ID order.
    pub fn jobs(&self) -> impl Iterator<Item = (&str, &PrintJob)> {
        self.jobs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Borrow the printer map.
    pub fn printer_map(&self) -> &BTreeMap<String, Printer> {
        &self.printers
    }

    /// Borrow the filament map.
    pub fn filament_map(&self) -> &BTreeMap<String, Filament> {
        &self.filaments
    }

    /// Borrow the job map.
    pub fn job_map(&self) -> &BTreeMap<String, PrintJob> {
        &self.jobs
    }

    pub(crate) fn put_printer(&mut self, printer: Printer) {
        self.printers.insert(printer.id.clone(), printer);
    }

    pub(crate) fn put_filament(&mut self, filament: Filament) {
        self.filaments.insert(filament.id.clone(), filament);
    }

    pub(crate) fn put_job(&mut self, job: PrintJob) {
        self.jobs.insert(job.id.clone(), job);
    }

    pub(crate) fn filament_mut(&mut self, id: &str) -> Option<&mut Filament> {
        self.filaments.get_mut(id)
    }

    pub(crate) fn job_mut(&mut self, id: &str) -> Option<&mut PrintJob> {
        self.jobs.get_mut(id)
    }
}
