//! Appointment types.
//!
//! An [`Appointment`] is the admitted form: every binding field is present.
//! An [`AppointmentDraft`] is what callers hand in, both for creation and as
//! the partial data of an edit; fields left as `None` are "not supplied".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  id::{AppointmentId, PersonId},
};

// ─── Time code ───────────────────────────────────────────────────────────────

/// An opaque, totally ordered slot number. Equal codes mean "same slot".
///
/// `0` is reserved for "not set".
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimeCode(u32);

impl TimeCode {
  pub const fn new(raw: u32) -> Self { Self(raw) }

  pub const fn get(self) -> u32 { self.0 }

  pub const fn is_set(self) -> bool { self.0 != 0 }
}

impl fmt::Display for TimeCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Appointment ─────────────────────────────────────────────────────────────

/// A booking of one patient with one staff member at one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
  /// [`AppointmentId::UNSET`] until the appointment registry admits it.
  pub id:         AppointmentId,
  pub patient_id: PersonId,
  pub staff_id:   PersonId,
  pub time:       TimeCode,
  pub reason:     Option<String>,
  pub location:   Option<String>,
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// Caller-supplied appointment data, possibly partial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDraft {
  pub patient_id: Option<PersonId>,
  pub staff_id:   Option<PersonId>,
  pub time:       Option<TimeCode>,
  pub reason:     Option<String>,
  pub location:   Option<String>,
}

impl AppointmentDraft {
  /// Convenience constructor for the three binding fields.
  pub fn new(patient_id: PersonId, staff_id: PersonId, time: TimeCode) -> Self {
    Self {
      patient_id: Some(patient_id),
      staff_id:   Some(staff_id),
      time:       Some(time),
      reason:     None,
      location:   None,
    }
  }

  pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
    self.reason = Some(reason.into());
    self
  }

  pub fn with_location(mut self, location: impl Into<String>) -> Self {
    self.location = Some(location.into());
    self
  }

  /// Overlay the supplied fields of `self` onto `base`; fields this draft
  /// leaves as `None` keep `base`'s value. The identifier is kept from `base`.
  /// An empty reason or location clears the stored one.
  pub fn merge_onto(self, base: &Appointment) -> Appointment {
    Appointment {
      id:         base.id,
      patient_id: self.patient_id.unwrap_or(base.patient_id),
      staff_id:   self.staff_id.unwrap_or(base.staff_id),
      time:       self.time.unwrap_or(base.time),
      reason:     note(self.reason.or_else(|| base.reason.clone())),
      location:   note(self.location.or_else(|| base.location.clone())),
    }
  }

  /// Turn the draft into an unadmitted [`Appointment`], failing with
  /// [`Error::IncompleteAppointment`] if a binding field is missing or zero.
  pub fn complete(self) -> Result<Appointment> {
    let appointment = Appointment {
      id:         AppointmentId::UNSET,
      patient_id: self.patient_id.unwrap_or_default(),
      staff_id:   self.staff_id.unwrap_or_default(),
      time:       self.time.unwrap_or_default(),
      reason:     note(self.reason),
      location:   note(self.location),
    };
    appointment.check_complete()?;
    Ok(appointment)
  }
}

/// Free-text fields hold no empty strings; empty means absent.
pub(crate) fn note(text: Option<String>) -> Option<String> {
  text.filter(|t| !t.is_empty())
}

impl Appointment {
  /// `true` when every binding field is set; admitted appointments always are.
  pub fn is_complete(&self) -> bool {
    self.patient_id.is_set() && self.staff_id.is_set() && self.time.is_set()
  }

  /// Fail with [`Error::IncompleteAppointment`] naming every unset field.
  pub fn check_complete(&self) -> Result<()> {
    let mut missing = Vec::new();
    if !self.patient_id.is_set() {
      missing.push("patient id");
    }
    if !self.staff_id.is_set() {
      missing.push("staff id");
    }
    if !self.time.is_set() {
      missing.push("time code");
    }
    if missing.is_empty() { Ok(()) } else { Err(Error::IncompleteAppointment { missing }) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn admitted() -> Appointment {
    Appointment {
      id:         AppointmentId::new(9),
      patient_id: PersonId::new(1),
      staff_id:   PersonId::new(2),
      time:       TimeCode::new(100),
      reason:     Some("checkup".into()),
      location:   None,
    }
  }

  #[test]
  fn complete_draft_becomes_unadmitted_appointment() {
    let appt = AppointmentDraft::new(PersonId::new(1), PersonId::new(2), TimeCode::new(5))
      .with_reason("flu")
      .complete()
      .unwrap();
    assert_eq!(appt.id, AppointmentId::UNSET);
    assert_eq!(appt.reason.as_deref(), Some("flu"));
    assert!(appt.is_complete());
  }

  #[test]
  fn missing_fields_are_reported_together() {
    let err = AppointmentDraft {
      staff_id: Some(PersonId::new(2)),
      ..Default::default()
    }
    .complete()
    .unwrap_err();
    assert_eq!(err, Error::IncompleteAppointment {
      missing: vec!["patient id", "time code"],
    });
  }

  #[test]
  fn zero_counts_as_missing() {
    let err = AppointmentDraft::new(PersonId::UNSET, PersonId::new(2), TimeCode::new(0))
      .complete()
      .unwrap_err();
    assert_eq!(err, Error::IncompleteAppointment {
      missing: vec!["patient id", "time code"],
    });
  }

  #[test]
  fn merge_keeps_unsupplied_fields() {
    let merged = AppointmentDraft {
      time: Some(TimeCode::new(200)),
      location: Some("Room 3".into()),
      ..Default::default()
    }
    .merge_onto(&admitted());

    assert_eq!(merged.id, AppointmentId::new(9));
    assert_eq!(merged.patient_id, PersonId::new(1));
    assert_eq!(merged.staff_id, PersonId::new(2));
    assert_eq!(merged.time, TimeCode::new(200));
    assert_eq!(merged.reason.as_deref(), Some("checkup"));
    assert_eq!(merged.location.as_deref(), Some("Room 3"));
  }

  #[test]
  fn empty_notes_mean_none() {
    let appt = AppointmentDraft::new(PersonId::new(1), PersonId::new(2), TimeCode::new(5))
      .with_reason("")
      .with_location("Room 1")
      .complete()
      .unwrap();
    assert_eq!(appt.reason, None);

    let cleared = AppointmentDraft { reason: Some(String::new()), ..Default::default() }
      .merge_onto(&admitted());
    assert_eq!(cleared.reason, None);
  }
}
