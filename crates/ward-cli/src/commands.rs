//! Command-line grammar and its translation into scheduler requests.

use anyhow::{Result, ensure};
use clap::{Args, Subcommand};
use ward_core::{
  appointment::{AppointmentDraft, TimeCode},
  id::{AppointmentId, PersonId},
  person::{Category, PersonDetails, PersonField, PersonFilter, PersonPatch},
  request::Request,
  schedule::TimeFilter,
};

use crate::time::parse_time;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Manage patients.
  #[command(subcommand)]
  Patient(PersonCommand),

  /// Manage staff members.
  #[command(subcommand)]
  Staff(PersonCommand),

  /// Manage appointments.
  #[command(subcommand)]
  Appointment(AppointmentCommand),
}

impl Command {
  /// What the command acts on, for messages.
  pub fn subject(&self) -> &'static str {
    match self {
      Self::Patient(_) => "patient",
      Self::Staff(_) => "staff",
      Self::Appointment(_) => "appointment",
    }
  }

  pub fn into_request(self) -> Result<Request> {
    match self {
      Self::Patient(cmd) => cmd.into_request(Category::Patient),
      Self::Staff(cmd) => cmd.into_request(Category::Staff),
      Self::Appointment(cmd) => cmd.into_request(),
    }
  }
}

// ─── Persons ─────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum PersonCommand {
  /// Register a new person.
  Add(PersonFields),

  /// Change some of a person's details.
  Edit {
    id: u32,
    #[command(flatten)]
    fields: PersonEdits,
  },

  /// Delete a person together with all their appointments.
  Delete { id: u32 },

  /// Show one person.
  View { id: u32 },

  /// List people, oldest first.
  List {
    /// Include archived people.
    #[arg(long)]
    all: bool,
  },

  /// Find people matching every filter, e.g. `n/tan p/9123`.
  ///
  /// Prefixes: n/ name, i/ IC number, p/ phone, e/ email, a/ address.
  Find {
    #[arg(required = true, value_parser = parse_filter)]
    filters: Vec<PersonFilter>,
  },

  /// Hide a person from the default listing.
  Archive { id: u32 },

  /// Undo `archive`.
  Unarchive { id: u32 },

  /// Show a person's appointments in time order.
  Appointments {
    id:     u32,
    /// Only appointments strictly before this time.
    #[arg(long, value_parser = parse_time, conflicts_with = "after")]
    before: Option<TimeCode>,
    /// Only appointments strictly after this time.
    #[arg(long, value_parser = parse_time)]
    after:  Option<TimeCode>,
  },
}

#[derive(Args, Debug)]
pub struct PersonFields {
  #[arg(long)]
  name:    String,
  #[arg(long)]
  ic:      String,
  #[arg(long, default_value = "")]
  phone:   String,
  #[arg(long, default_value = "")]
  email:   String,
  #[arg(long, default_value = "")]
  address: String,
}

#[derive(Args, Debug)]
pub struct PersonEdits {
  #[arg(long)]
  name:    Option<String>,
  #[arg(long)]
  ic:      Option<String>,
  #[arg(long)]
  phone:   Option<String>,
  #[arg(long)]
  email:   Option<String>,
  #[arg(long)]
  address: Option<String>,
}

impl PersonCommand {
  fn into_request(self, category: Category) -> Result<Request> {
    let request = match self {
      Self::Add(f) => Request::AddPerson {
        category,
        details: PersonDetails {
          name:      f.name,
          ic_number: f.ic,
          phone:     f.phone,
          email:     f.email,
          address:   f.address,
        },
      },
      Self::Edit { id, fields: f } => {
        let patch = PersonPatch {
          name:      f.name,
          ic_number: f.ic,
          phone:     f.phone,
          email:     f.email,
          address:   f.address,
        };
        ensure!(!patch.is_empty(), "nothing to change: pass at least one field");
        Request::EditPerson { category, id: PersonId::new(id), patch }
      }
      Self::Delete { id } => Request::DeletePerson { category, id: PersonId::new(id) },
      Self::View { id } => Request::ViewPerson { category, id: PersonId::new(id) },
      Self::List { all } => Request::ListPersons { category, include_archived: all },
      Self::Find { filters } => Request::FindPersons { category, filters },
      Self::Archive { id } => Request::ArchivePerson { category, id: PersonId::new(id) },
      Self::Unarchive { id } => Request::UnarchivePerson { category, id: PersonId::new(id) },
      Self::Appointments { id, before, after } => Request::ListPersonAppointments {
        category,
        id: PersonId::new(id),
        filter: match (before, after) {
          (Some(t), _) => TimeFilter::Before(t),
          (None, Some(t)) => TimeFilter::After(t),
          (None, None) => TimeFilter::All,
        },
      },
    };
    Ok(request)
  }
}

/// Parse a `prefix/needle` search token.
pub fn parse_filter(token: &str) -> Result<PersonFilter, String> {
  let (prefix, needle) = token
    .split_once('/')
    .ok_or_else(|| format!("expected PREFIX/TEXT, got {token:?}"))?;
  let field = match prefix {
    "n" => PersonField::Name,
    "i" => PersonField::IcNumber,
    "p" => PersonField::Phone,
    "e" => PersonField::Email,
    "a" => PersonField::Address,
    other => return Err(format!("unknown filter prefix {other:?}; use n, i, p, e or a")),
  };
  if needle.trim().is_empty() {
    return Err(format!("filter {prefix}/ needs some text"));
  }
  Ok(PersonFilter::new(field, needle))
}

// ─── Appointments ────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum AppointmentCommand {
  /// Book a patient with a staff member.
  Add {
    #[arg(long)]
    patient:  u32,
    #[arg(long)]
    staff:    u32,
    /// `YYYY-MM-DD HH:MM` or a raw time code.
    #[arg(long, value_parser = parse_time)]
    at:       TimeCode,
    #[arg(long)]
    reason:   Option<String>,
    #[arg(long)]
    location: Option<String>,
  },

  /// Change some fields of an appointment. The id stays the same.
  Edit {
    id:       u32,
    #[arg(long)]
    patient:  Option<u32>,
    #[arg(long)]
    staff:    Option<u32>,
    #[arg(long, value_parser = parse_time)]
    at:       Option<TimeCode>,
    /// New reason. Pass an empty string to clear it.
    #[arg(long)]
    reason:   Option<String>,
    /// New location. Pass an empty string to clear it.
    #[arg(long)]
    location: Option<String>,
  },

  /// Cancel an appointment.
  Delete { id: u32 },

  /// Show one appointment.
  View { id: u32 },

  /// List every appointment by id.
  List,
}

impl AppointmentCommand {
  fn into_request(self) -> Result<Request> {
    let request = match self {
      Self::Add { patient, staff, at, reason, location } => {
        Request::AddAppointment(AppointmentDraft {
          patient_id: Some(PersonId::new(patient)),
          staff_id: Some(PersonId::new(staff)),
          time: Some(at),
          reason,
          location,
        })
      }
      Self::Edit { id, patient, staff, at, reason, location } => {
        let patch = AppointmentDraft {
          patient_id: patient.map(PersonId::new),
          staff_id: staff.map(PersonId::new),
          time: at,
          reason,
          location,
        };
        ensure!(
          patch != AppointmentDraft::default(),
          "nothing to change: pass at least one field"
        );
        Request::EditAppointment { id: AppointmentId::new(id), patch }
      }
      Self::Delete { id } => Request::DeleteAppointment(AppointmentId::new(id)),
      Self::View { id } => Request::ViewAppointment(AppointmentId::new(id)),
      Self::List => Request::ListAppointments,
    };
    Ok(request)
  }
}

#[cfg(test)]
mod tests {
  use clap::Parser;

  use super::*;

  #[derive(Parser)]
  struct Harness {
    #[command(subcommand)]
    command: Command,
  }

  fn request(args: &[&str]) -> Result<Request> {
    let harness = Harness::try_parse_from(std::iter::once("ward").chain(args.iter().copied()))?;
    harness.command.into_request()
  }

  #[test]
  fn add_appointment_accepts_a_date() {
    let req = request(&[
      "appointment", "add", "--patient", "1", "--staff", "2", "--at", "2000-01-01 01:40",
    ])
    .unwrap();
    assert_eq!(
      req,
      Request::AddAppointment(AppointmentDraft::new(
        PersonId::new(1),
        PersonId::new(2),
        TimeCode::new(100),
      ))
    );
  }

  #[test]
  fn find_builds_filters_from_prefixes() {
    let req = request(&["staff", "find", "n/tan", "p/9123"]).unwrap();
    assert_eq!(req, Request::FindPersons {
      category: Category::Staff,
      filters:  vec![
        PersonFilter::new(PersonField::Name, "tan"),
        PersonFilter::new(PersonField::Phone, "9123"),
      ],
    });
  }

  #[test]
  fn bad_filter_prefix_is_a_usage_error() {
    assert!(request(&["patient", "find", "x/tan"]).is_err());
    assert!(parse_filter("n/  ").is_err());
  }

  #[test]
  fn empty_edits_are_refused() {
    let err = request(&["patient", "edit", "3"]).unwrap_err();
    assert!(err.to_string().contains("nothing to change"));
    assert!(request(&["appointment", "edit", "3"]).is_err());
  }

  #[test]
  fn person_appointments_take_a_bound() {
    let req = request(&["patient", "appointments", "4", "--after", "50"]).unwrap();
    assert_eq!(req, Request::ListPersonAppointments {
      category: Category::Patient,
      id:       PersonId::new(4),
      filter:   TimeFilter::After(TimeCode::new(50)),
    });
    assert!(request(&["patient", "appointments", "4", "--after", "5", "--before", "9"]).is_err());
  }
}
