//! Request / response types for the command layer.
//!
//! | Request | Response |
//! |---------|----------|
//! | `AddPerson` | `PersonAdded` |
//! | `EditPerson` | `Person` (the edited record) |
//! | `DeletePerson` | `PersonDeleted` |
//! | `ViewPerson` | `Person` |
//! | `ListPersons` / `FindPersons` | `Persons` |
//! | `ArchivePerson` / `UnarchivePerson` | `ArchiveChanged` |
//! | `ListPersonAppointments` | `Appointments` |
//! | `AddAppointment` | `AppointmentAdded` |
//! | `EditAppointment` / `ViewAppointment` | `Appointment` |
//! | `DeleteAppointment` | `AppointmentDeleted` |
//! | `ListAppointments` | `Appointments` |

use serde::{Deserialize, Serialize};

use crate::{
  Result, Scheduler,
  appointment::AppointmentDraft,
  id::{AppointmentId, PersonId},
  person::{Category, PersonDetails, PersonFilter, PersonPatch},
  record::{AppointmentRecord, PersonRecord},
  schedule::TimeFilter,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
  AddPerson {
    category: Category,
    details:  PersonDetails,
  },
  EditPerson {
    category: Category,
    id:       PersonId,
    patch:    PersonPatch,
  },
  DeletePerson {
    category: Category,
    id:       PersonId,
  },
  ViewPerson {
    category: Category,
    id:       PersonId,
  },
  ListPersons {
    category:         Category,
    include_archived: bool,
  },
  FindPersons {
    category: Category,
    filters:  Vec<PersonFilter>,
  },
  ArchivePerson {
    category: Category,
    id:       PersonId,
  },
  UnarchivePerson {
    category: Category,
    id:       PersonId,
  },
  ListPersonAppointments {
    category: Category,
    id:       PersonId,
    filter:   TimeFilter,
  },
  AddAppointment(AppointmentDraft),
  EditAppointment {
    id:    AppointmentId,
    patch: AppointmentDraft,
  },
  DeleteAppointment(AppointmentId),
  ViewAppointment(AppointmentId),
  ListAppointments,
}

impl Request {
  /// Whether a successful run changes state that should be persisted.
  pub fn mutates(&self) -> bool {
    !matches!(
      self,
      Self::ViewPerson { .. }
        | Self::ListPersons { .. }
        | Self::FindPersons { .. }
        | Self::ListPersonAppointments { .. }
        | Self::ViewAppointment(_)
        | Self::ListAppointments
    )
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Response {
  PersonAdded(PersonId),
  Person(PersonRecord),
  PersonDeleted {
    id:        PersonId,
    /// Appointments removed because the person held them.
    cascaded:  Vec<AppointmentRecord>,
  },
  Persons(Vec<PersonRecord>),
  ArchiveChanged {
    id:       PersonId,
    archived: bool,
  },
  AppointmentAdded(AppointmentId),
  Appointment(AppointmentRecord),
  AppointmentDeleted(AppointmentRecord),
  Appointments(Vec<AppointmentRecord>),
}

impl Scheduler {
  /// Run one request to completion.
  pub fn handle(&mut self, request: Request) -> Result<Response> {
    let response = match request {
      Request::AddPerson { category, details } => {
        Response::PersonAdded(self.add_person(category, details)?)
      }
      Request::EditPerson { category, id, patch } => {
        Response::Person(self.edit_person(category, id, patch)?.into())
      }
      Request::DeletePerson { category, id } => {
        let cascaded = self.delete_person(category, id)?;
        Response::PersonDeleted {
          id,
          cascaded: cascaded.iter().map(AppointmentRecord::from).collect(),
        }
      }
      Request::ViewPerson { category, id } => Response::Person(self.person(category, id)?.into()),
      Request::ListPersons { category, include_archived } => Response::Persons(
        self
          .list_persons(category, include_archived)
          .into_iter()
          .map(PersonRecord::from)
          .collect(),
      ),
      Request::FindPersons { category, filters } => Response::Persons(
        self
          .find_persons(category, &filters)
          .into_iter()
          .map(PersonRecord::from)
          .collect(),
      ),
      Request::ArchivePerson { category, id } => {
        self.archive_person(category, id)?;
        Response::ArchiveChanged { id, archived: true }
      }
      Request::UnarchivePerson { category, id } => {
        self.unarchive_person(category, id)?;
        Response::ArchiveChanged { id, archived: false }
      }
      Request::ListPersonAppointments { category, id, filter } => Response::Appointments(
        self
          .person_appointments(category, id, filter)?
          .into_iter()
          .map(AppointmentRecord::from)
          .collect(),
      ),
      Request::AddAppointment(draft) => Response::AppointmentAdded(self.add_appointment(draft)?),
      Request::EditAppointment { id, patch } => {
        Response::Appointment(self.edit_appointment(id, patch)?.into())
      }
      Request::DeleteAppointment(id) => {
        Response::AppointmentDeleted((&self.delete_appointment(id)?).into())
      }
      Request::ViewAppointment(id) => Response::Appointment(self.appointment(id)?.into()),
      Request::ListAppointments => {
        Response::Appointments(self.appointments().map(AppointmentRecord::from).collect())
      }
    };
    Ok(response)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Error, appointment::TimeCode};

  #[test]
  fn reads_do_not_mutate() {
    assert!(!Request::ListAppointments.mutates());
    assert!(!Request::ViewAppointment(AppointmentId::new(1)).mutates());
    assert!(Request::DeleteAppointment(AppointmentId::new(1)).mutates());
  }

  #[test]
  fn dispatches_end_to_end() {
    let mut s = Scheduler::new();

    let Response::PersonAdded(patient) = s
      .handle(Request::AddPerson {
        category: Category::Patient,
        details:  PersonDetails { name: "Pat".into(), ..Default::default() },
      })
      .unwrap()
    else {
      panic!("expected PersonAdded")
    };
    let Response::PersonAdded(staff) = s
      .handle(Request::AddPerson {
        category: Category::Staff,
        details:  PersonDetails { name: "Sam".into(), ..Default::default() },
      })
      .unwrap()
    else {
      panic!("expected PersonAdded")
    };

    let response = s
      .handle(Request::AddAppointment(AppointmentDraft::new(
        patient,
        staff,
        TimeCode::new(100),
      )))
      .unwrap();
    assert_eq!(response, Response::AppointmentAdded(AppointmentId::new(1)));

    let Response::Appointments(list) = s
      .handle(Request::ListPersonAppointments {
        category: Category::Staff,
        id:       staff,
        filter:   TimeFilter::All,
      })
      .unwrap()
    else {
      panic!("expected Appointments")
    };
    assert_eq!(list.len(), 1);

    let Response::PersonDeleted { cascaded, .. } = s
      .handle(Request::DeletePerson { category: Category::Patient, id: patient })
      .unwrap()
    else {
      panic!("expected PersonDeleted")
    };
    assert_eq!(cascaded.len(), 1);

    let err = s.handle(Request::ViewAppointment(AppointmentId::new(1))).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
  }

  #[test]
  fn responses_serialise_with_a_kind_tag() {
    let json = serde_json::to_string(&Response::AppointmentAdded(AppointmentId::new(3))).unwrap();
    assert_eq!(json, r#"{"kind":"appointment_added","data":3}"#);
  }
}
