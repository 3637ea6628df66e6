//! Error types for `ward-core`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::{appointment::TimeCode, id::AppointmentId, person::Category};

/// The kind of record an error refers to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Entity {
  Patient,
  Staff,
  Appointment,
}

impl From<Category> for Entity {
  fn from(category: Category) -> Self {
    match category {
      Category::Patient => Self::Patient,
      Category::Staff => Self::Staff,
    }
  }
}

/// The archive flag a person was already carrying when asked to change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ArchiveState {
  Archived,
  Unarchived,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("no {entity} with id {id}")]
  NotFound { entity: Entity, id: u32 },

  #[error("no appointment at time code {0}")]
  NoAppointmentAt(TimeCode),

  #[error("incomplete appointment: missing {}", missing.join(", "))]
  IncompleteAppointment { missing: Vec<&'static str> },

  #[error("{party} unavailable, appointment {appointment} at time code {time}")]
  Clash {
    party:       Category,
    appointment: AppointmentId,
    time:        TimeCode,
  },

  #[error("time code {time} is already taken by appointment {occupant}")]
  SlotOccupied {
    time:     TimeCode,
    occupant: AppointmentId,
  },

  #[error("{entity} {id} is already {state}")]
  AlreadyInState {
    entity: Entity,
    id:     u32,
    state:  ArchiveState,
  },

  #[error("{entity} id {id} is already in use")]
  IdInUse { entity: Entity, id: u32 },

  #[error("no {entity} ids left to issue")]
  IdsExhausted { entity: Entity },

  #[error("invalid state: {0}")]
  InvalidState(String),
}

impl Error {
  pub(crate) fn not_found(entity: impl Into<Entity>, id: u32) -> Self {
    Self::NotFound { entity: entity.into(), id }
  }

  /// `true` for every "the thing you referenced does not exist" variant.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound { .. } | Self::NoAppointmentAt(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages_name_the_category() {
    let err = Error::not_found(Category::Patient, 7);
    assert_eq!(err.to_string(), "no patient with id 7");

    let err = Error::not_found(Entity::Appointment, 3);
    assert_eq!(err.to_string(), "no appointment with id 3");
  }

  #[test]
  fn clash_message_names_party_and_occupant() {
    let err = Error::Clash {
      party:       Category::Staff,
      appointment: AppointmentId::new(4),
      time:        TimeCode::new(100),
    };
    assert_eq!(
      err.to_string(),
      "staff unavailable, appointment 4 at time code 100"
    );
  }

  #[test]
  fn incomplete_lists_every_missing_field() {
    let err = Error::IncompleteAppointment {
      missing: vec!["patient id", "time code"],
    };
    assert_eq!(
      err.to_string(),
      "incomplete appointment: missing patient id, time code"
    );
  }

  #[test]
  fn not_found_grouping() {
    assert!(Error::not_found(Category::Staff, 1).is_not_found());
    assert!(Error::NoAppointmentAt(TimeCode::new(5)).is_not_found());
    assert!(!Error::InvalidState("x".into()).is_not_found());
  }
}
