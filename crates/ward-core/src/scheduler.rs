//! [`Scheduler`] — the only component that mutates more than one collection.
//!
//! The scheduler owns the appointment registry and both person registries.
//! Every appointment in the registry is mirrored, by value, in the schedule
//! of its patient and of its staff member at its time code, and nothing else
//! lives in any schedule. Each public operation either leaves that mirror
//! intact and succeeds, or changes nothing and fails.
//!
//! All checks that can fail for ordinary reasons (missing records, clashes,
//! incomplete data) run before the first write. A mirror write that still
//! fails afterwards is a defect: the scheduler rolls back what it already
//! wrote, logs it, trips a debug assertion, and reports
//! [`Error::InvalidState`].

use tracing::{debug, error, info, warn};

use crate::{
  Error, Result,
  appointment::{Appointment, AppointmentDraft},
  error::Entity,
  id::{AppointmentId, PersonId},
  person::{Category, Person, PersonDetails, PersonFilter, PersonPatch},
  record::{AppointmentRecord, LoadIssue, PersonRecord, Snapshot, Table},
  registry::{AppointmentRegistry, PersonRegistry},
  schedule::TimeFilter,
};

const CATEGORIES: [Category; 2] = [Category::Patient, Category::Staff];

#[derive(Debug, Clone)]
pub struct Scheduler {
  patients:     PersonRegistry,
  staff:        PersonRegistry,
  appointments: AppointmentRegistry,
}

impl Default for Scheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler {
  pub fn new() -> Self {
    Self {
      patients:     PersonRegistry::new(Category::Patient),
      staff:        PersonRegistry::new(Category::Staff),
      appointments: AppointmentRegistry::new(),
    }
  }

  pub fn registry(&self, category: Category) -> &PersonRegistry {
    match category {
      Category::Patient => &self.patients,
      Category::Staff => &self.staff,
    }
  }

  fn registry_mut(&mut self, category: Category) -> &mut PersonRegistry {
    match category {
      Category::Patient => &mut self.patients,
      Category::Staff => &mut self.staff,
    }
  }

  pub fn appointment_registry(&self) -> &AppointmentRegistry { &self.appointments }

  // ── Persons ───────────────────────────────────────────────────────────────

  pub fn add_person(&mut self, category: Category, details: PersonDetails) -> Result<PersonId> {
    let id = self.registry_mut(category).add(Person::new(details))?;
    debug!(%category, %id, "person added");
    Ok(id)
  }

  pub fn add_patient(&mut self, details: PersonDetails) -> Result<PersonId> {
    self.add_person(Category::Patient, details)
  }

  pub fn add_staff(&mut self, details: PersonDetails) -> Result<PersonId> {
    self.add_person(Category::Staff, details)
  }

  pub fn person(&self, category: Category, id: PersonId) -> Result<&Person> {
    self.registry(category).get(id)
  }

  pub fn edit_person(
    &mut self,
    category: Category,
    id: PersonId,
    patch: PersonPatch,
  ) -> Result<&Person> {
    let person = self.registry_mut(category).edit(id, patch)?;
    debug!(%category, %id, "person edited");
    Ok(person)
  }

  /// Delete every appointment the person holds, then the person. Returns the
  /// appointments that were removed along the way.
  pub fn delete_person(&mut self, category: Category, id: PersonId) -> Result<Vec<Appointment>> {
    let owned = self.registry(category).schedule(id)?.ids();

    let mut removed = Vec::with_capacity(owned.len());
    for appointment_id in owned {
      let appointment = self
        .retire(appointment_id)
        .map_err(|err| defect("cascading person delete", err))?;
      removed.push(appointment);
    }

    self
      .registry_mut(category)
      .remove(id)
      .map_err(|err| defect("removing person after cascade", err))?;

    info!(%category, %id, cascaded = removed.len(), "person deleted");
    Ok(removed)
  }

  pub fn delete_patient(&mut self, id: PersonId) -> Result<Vec<Appointment>> {
    self.delete_person(Category::Patient, id)
  }

  pub fn delete_staff(&mut self, id: PersonId) -> Result<Vec<Appointment>> {
    self.delete_person(Category::Staff, id)
  }

  pub fn archive_person(&mut self, category: Category, id: PersonId) -> Result<()> {
    self.registry_mut(category).archive(id)
  }

  pub fn unarchive_person(&mut self, category: Category, id: PersonId) -> Result<()> {
    self.registry_mut(category).unarchive(id)
  }

  pub fn find_persons(&self, category: Category, filters: &[PersonFilter]) -> Vec<&Person> {
    self.registry(category).find(filters)
  }

  pub fn list_persons(&self, category: Category, include_archived: bool) -> Vec<&Person> {
    self.registry(category).list(include_archived)
  }

  /// The person's appointments in time order, narrowed by `filter`.
  pub fn person_appointments(
    &self,
    category: Category,
    id: PersonId,
    filter: TimeFilter,
  ) -> Result<Vec<&Appointment>> {
    Ok(self.registry(category).schedule(id)?.filtered(filter))
  }

  // ── Appointments ──────────────────────────────────────────────────────────

  pub fn appointment(&self, id: AppointmentId) -> Result<&Appointment> {
    self.appointments.get(id)
  }

  /// Every admitted appointment in id order.
  pub fn appointments(&self) -> impl Iterator<Item = &Appointment> + '_ {
    self.appointments.iter()
  }

  /// Admit a new appointment and return the id the registry assigned it.
  pub fn add_appointment(&mut self, draft: AppointmentDraft) -> Result<AppointmentId> {
    let appointment = draft.complete()?;
    self.check_availability(&appointment)?;
    let id = self.admit(appointment)?;
    debug!(%id, "appointment added");
    Ok(id)
  }

  /// Remove an appointment from the registry and both schedules.
  pub fn delete_appointment(&mut self, id: AppointmentId) -> Result<Appointment> {
    let removed = self.retire(id)?;
    debug!(%id, "appointment deleted");
    Ok(removed)
  }

  /// Merge `patch` onto appointment `id` and re-validate the result.
  ///
  /// The appointment keeps its id. The old slot does not count as a clash
  /// against itself, so re-saving an appointment at its own time succeeds.
  pub fn edit_appointment(
    &mut self,
    id: AppointmentId,
    patch: AppointmentDraft,
  ) -> Result<&Appointment> {
    let original = self.appointments.get(id)?.clone();
    let merged = patch.merge_onto(&original);
    merged.check_complete()?;
    self.check_availability(&merged)?;

    let original = self.retire(id).map_err(|err| defect("edit: removing old record", err))?;
    if let Err(err) = self.admit(merged) {
      if let Err(restore_err) = self.admit(original) {
        error!(%id, error = %restore_err, "could not restore appointment after failed edit");
      }
      return Err(defect("edit: admitting merged record", err));
    }

    debug!(%id, "appointment edited");
    self.appointments.get(id)
  }

  /// Fail with [`Error::Clash`] if either party already holds a different
  /// appointment at the requested time, or with `NotFound` if either party
  /// does not exist.
  fn check_availability(&self, appointment: &Appointment) -> Result<()> {
    let parties = [
      (Category::Patient, appointment.patient_id),
      (Category::Staff, appointment.staff_id),
    ];
    for (party, person_id) in parties {
      let occupant = self.registry(party).appointment_at(person_id, appointment.time)?;
      if let Some(occupant) = occupant
        && occupant != appointment.id
      {
        warn!(%party, %person_id, time = %appointment.time, %occupant, "appointment clash");
        return Err(Error::Clash {
          party,
          appointment: occupant,
          time: appointment.time,
        });
      }
    }
    Ok(())
  }

  /// Registry first, then both schedules. On a schedule failure the registry
  /// write is undone. An appointment that already carries an id keeps it.
  fn admit(&mut self, appointment: Appointment) -> Result<AppointmentId> {
    let stored = if appointment.id.is_set() {
      self.appointments.insert_with_id(appointment)?.clone()
    } else {
      self.appointments.add(appointment)?.clone()
    };

    if let Err(err) = self.link(&stored) {
      // Undoing our own insert cannot fail.
      let _ = self.appointments.delete(stored.id);
      return Err(defect("linking appointment into schedules", err));
    }
    Ok(stored.id)
  }

  /// Registry first, then both schedules. On a schedule failure the registry
  /// record is put back.
  fn retire(&mut self, id: AppointmentId) -> Result<Appointment> {
    let removed = self.appointments.delete(id)?;
    if let Err(err) = self.unlink(&removed) {
      let _ = self.appointments.insert_with_id(removed);
      return Err(defect("unlinking appointment from schedules", err));
    }
    Ok(removed)
  }

  fn link(&mut self, appointment: &Appointment) -> Result<()> {
    self
      .patients
      .schedule_mut(appointment.patient_id)?
      .add(appointment.clone())?;

    let staff_side = self
      .staff
      .schedule_mut(appointment.staff_id)
      .and_then(|schedule| schedule.add(appointment.clone()));

    if let Err(err) = staff_side {
      if let Ok(schedule) = self.patients.schedule_mut(appointment.patient_id) {
        let _ = schedule.remove_at(appointment.time);
      }
      return Err(err);
    }
    Ok(())
  }

  fn unlink(&mut self, appointment: &Appointment) -> Result<()> {
    let patient_copy = self
      .patients
      .schedule_mut(appointment.patient_id)?
      .remove_at(appointment.time)?;

    let staff_side = self
      .staff
      .schedule_mut(appointment.staff_id)
      .and_then(|schedule| schedule.remove_at(appointment.time));

    if let Err(err) = staff_side {
      if let Ok(schedule) = self.patients.schedule_mut(appointment.patient_id) {
        let _ = schedule.add(patient_copy);
      }
      return Err(err);
    }
    Ok(())
  }

  // ── Consistency ───────────────────────────────────────────────────────────

  /// Check the three-way mirror: every registry appointment sits, identical,
  /// in both parties' schedules at its time code, and the schedules hold
  /// nothing else.
  pub fn verify(&self) -> Result<()> {
    for appointment in self.appointments.iter() {
      let parties = [
        (Category::Patient, appointment.patient_id),
        (Category::Staff, appointment.staff_id),
      ];
      for (party, person_id) in parties {
        let schedule = self.registry(party).schedule(person_id).map_err(|_| {
          Error::InvalidState(format!(
            "appointment {} references missing {party} {person_id}",
            appointment.id
          ))
        })?;
        if schedule.get(appointment.time) != Some(appointment) {
          return Err(Error::InvalidState(format!(
            "appointment {} is not mirrored in {party} {person_id}'s schedule",
            appointment.id
          )));
        }
      }
    }

    for category in CATEGORIES {
      let mirrored: usize = self.registry(category).iter().map(|p| p.schedule().len()).sum();
      if mirrored != self.appointments.len() {
        return Err(Error::InvalidState(format!(
          "{category} schedules hold {mirrored} appointments, registry holds {}",
          self.appointments.len()
        )));
      }
    }
    Ok(())
  }

  // ── Import / export ───────────────────────────────────────────────────────

  pub fn export_persons(&self, category: Category) -> Vec<PersonRecord> {
    self.registry(category).iter().map(PersonRecord::from).collect()
  }

  pub fn export_appointments(&self) -> Vec<AppointmentRecord> {
    self.appointments.iter().map(AppointmentRecord::from).collect()
  }

  /// Load one person record under its stored id.
  pub fn import_person(&mut self, category: Category, record: PersonRecord) -> Result<PersonId> {
    let mut person = Person::new(record.details);
    person.archived = record.archived;
    self.registry_mut(category).insert_with_id(record.id, person)
  }

  /// Load one appointment record under its stored id, with the same
  /// completeness and availability checks as [`Self::add_appointment`].
  pub fn import_appointment(&mut self, record: AppointmentRecord) -> Result<AppointmentId> {
    let appointment = Appointment::from(record);
    if !appointment.id.is_set() {
      return Err(Error::InvalidState(
        "cannot load an appointment without an id".to_string(),
      ));
    }
    appointment.check_complete()?;
    if self.appointments.contains(appointment.id) {
      return Err(Error::IdInUse {
        entity: Entity::Appointment,
        id:     appointment.id.get(),
      });
    }
    self.check_availability(&appointment)?;
    self.admit(appointment)
  }

  pub fn snapshot(&self) -> Snapshot {
    Snapshot {
      patients:     Table {
        next_id: self.patients.cursor(),
        records: self.export_persons(Category::Patient),
      },
      staff:        Table {
        next_id: self.staff.cursor(),
        records: self.export_persons(Category::Staff),
      },
      appointments: Table {
        next_id: self.appointments.cursor(),
        records: self.export_appointments(),
      },
    }
  }

  /// Rebuild a scheduler from `snapshot`. Records that fail their checks are
  /// skipped and reported; the rest load normally.
  pub fn restore(snapshot: Snapshot) -> (Self, Vec<LoadIssue>) {
    let Snapshot { patients, staff, appointments } = snapshot;
    let mut scheduler = Self::new();
    let mut issues = Vec::new();

    for (category, table) in [(Category::Patient, patients), (Category::Staff, staff)] {
      for record in table.records {
        let id = record.id;
        if let Err(err) = scheduler.import_person(category, record) {
          warn!(%category, %id, error = %err, "skipping stored record");
          issues.push(LoadIssue {
            source:  format!("{category} {id}"),
            message: err.to_string(),
          });
        }
      }
      scheduler.registry_mut(category).resume_from(table.next_id);
    }

    for record in appointments.records {
      let id = record.id;
      if let Err(err) = scheduler.import_appointment(record) {
        warn!(%id, error = %err, "skipping stored appointment");
        issues.push(LoadIssue {
          source:  format!("appointment {id}"),
          message: err.to_string(),
        });
      }
    }
    scheduler.appointments.resume_from(appointments.next_id);

    info!(
      patients = scheduler.patients.len(),
      staff = scheduler.staff.len(),
      appointments = scheduler.appointments.len(),
      skipped = issues.len(),
      "scheduler restored"
    );
    (scheduler, issues)
  }
}

/// Report an internal invariant break. These cannot happen if the pre-checks
/// are right, so they are loud in debug builds and never surface as an
/// ordinary not-found.
fn defect(operation: &str, err: Error) -> Error {
  error!(operation, error = %err, "scheduler invariant violated");
  if cfg!(debug_assertions) {
    panic!("scheduler invariant violated during {operation}: {err}");
  }
  match err {
    Error::InvalidState(_) => err,
    other => Error::InvalidState(format!("{operation}: {other}")),
  }
}
