//! Flat records exchanged with persistence backends and the command layer.
//!
//! Records carry no schedules; the schedules are rebuilt from the appointment
//! records when a snapshot is restored.

use serde::{Deserialize, Serialize};

use crate::{
  appointment::{Appointment, TimeCode},
  id::{AppointmentId, PersonId},
  person::{Person, PersonDetails},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
  pub id:       PersonId,
  #[serde(flatten)]
  pub details:  PersonDetails,
  pub archived: bool,
}

impl From<&Person> for PersonRecord {
  fn from(person: &Person) -> Self {
    Self {
      id:       person.id(),
      details:  person.details.clone(),
      archived: person.is_archived(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
  pub id:         AppointmentId,
  pub patient_id: PersonId,
  pub staff_id:   PersonId,
  pub time:       TimeCode,
  pub reason:     Option<String>,
  pub location:   Option<String>,
}

impl From<&Appointment> for AppointmentRecord {
  fn from(a: &Appointment) -> Self {
    Self {
      id:         a.id,
      patient_id: a.patient_id,
      staff_id:   a.staff_id,
      time:       a.time,
      reason:     a.reason.clone(),
      location:   a.location.clone(),
    }
  }
}

impl From<AppointmentRecord> for Appointment {
  fn from(r: AppointmentRecord) -> Self {
    Self {
      id:         r.id,
      patient_id: r.patient_id,
      staff_id:   r.staff_id,
      time:       r.time,
      reason:     crate::appointment::note(r.reason),
      location:   crate::appointment::note(r.location),
    }
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// One collection's records plus its allocator cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table<R> {
  pub next_id: u32,
  pub records: Vec<R>,
}

impl<R> Default for Table<R> {
  fn default() -> Self { Self { next_id: 1, records: Vec::new() } }
}

/// The full persisted state of a [`crate::Scheduler`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub patients:     Table<PersonRecord>,
  pub staff:        Table<PersonRecord>,
  pub appointments: Table<AppointmentRecord>,
}

/// A record or line that could not be loaded, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadIssue {
  /// Where the problem was found, e.g. `appointments.txt:4` or `appointment 7`.
  pub source:  String,
  pub message: String,
}

impl std::fmt::Display for LoadIssue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: {}", self.source, self.message)
  }
}
