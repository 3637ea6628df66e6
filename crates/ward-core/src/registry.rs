//! The two kinds of registry the scheduler coordinates.
//!
//! - [`PersonRegistry`]: one instance per [`Category`]; the category is the
//!   only thing that differs between the patient and staff registries and it
//!   drives every error message.
//! - [`AppointmentRegistry`]: the system of record for appointment existence.
//!
//! Neither registry enforces cross-entity rules; that is the scheduler's job.

use std::collections::BTreeMap;

use crate::{
  Error, Result,
  appointment::{Appointment, TimeCode},
  error::{ArchiveState, Entity},
  id::{AppointmentId, IdAllocator, PersonId},
  person::{Category, Person, PersonFilter, PersonPatch},
  schedule::PersonalSchedule,
};

// ─── Persons ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PersonRegistry {
  category: Category,
  persons:  BTreeMap<PersonId, Person>,
  ids:      IdAllocator,
}

impl PersonRegistry {
  pub fn new(category: Category) -> Self {
    Self {
      category,
      persons: BTreeMap::new(),
      ids: IdAllocator::default(),
    }
  }

  pub fn len(&self) -> usize { self.persons.len() }

  pub fn is_empty(&self) -> bool { self.persons.is_empty() }

  /// Allocator position to persist alongside the records.
  pub fn cursor(&self) -> u32 { self.ids.cursor() }

  pub(crate) fn resume_from(&mut self, cursor: u32) {
    self.ids.observe(cursor.saturating_sub(1));
  }

  fn not_found(&self, id: PersonId) -> Error { Error::not_found(self.category, id.get()) }

  /// Store `person` under a freshly allocated id and return it.
  pub fn add(&mut self, mut person: Person) -> Result<PersonId> {
    let persons = &self.persons;
    let raw = self
      .ids
      .next(|raw| persons.contains_key(&PersonId::new(raw)))
      .ok_or(Error::IdsExhausted { entity: self.category.into() })?;
    let id = PersonId::new(raw);
    person.id = id;
    self.persons.insert(id, person);
    Ok(id)
  }

  /// Store `person` under a caller-supplied id (used when loading).
  pub fn insert_with_id(&mut self, id: PersonId, mut person: Person) -> Result<PersonId> {
    if !id.is_set() {
      return Err(Error::InvalidState(format!(
        "cannot load a {} without an id",
        self.category
      )));
    }
    if !IdAllocator::accepts(id.get()) {
      return Err(Error::InvalidState(format!("{} id {id} is out of range", self.category)));
    }
    if self.persons.contains_key(&id) {
      return Err(Error::IdInUse { entity: self.category.into(), id: id.get() });
    }
    person.id = id;
    self.ids.observe(id.get());
    self.persons.insert(id, person);
    Ok(id)
  }

  pub fn contains(&self, id: PersonId) -> bool { self.persons.contains_key(&id) }

  pub fn get(&self, id: PersonId) -> Result<&Person> {
    self.persons.get(&id).ok_or_else(|| self.not_found(id))
  }

  fn get_mut(&mut self, id: PersonId) -> Result<&mut Person> {
    let category = self.category;
    self
      .persons
      .get_mut(&id)
      .ok_or_else(|| Error::not_found(category, id.get()))
  }

  /// Merge `patch` into the stored details.
  pub fn edit(&mut self, id: PersonId, patch: PersonPatch) -> Result<&Person> {
    let person = self.get_mut(id)?;
    person.details.apply(patch);
    Ok(person)
  }

  /// Remove the person and discard their schedule. Callers must have
  /// cascaded appointment deletion first.
  pub fn remove(&mut self, id: PersonId) -> Result<Person> {
    self.persons.remove(&id).ok_or_else(|| self.not_found(id))
  }

  pub fn archive(&mut self, id: PersonId) -> Result<()> { self.set_archived(id, true) }

  pub fn unarchive(&mut self, id: PersonId) -> Result<()> { self.set_archived(id, false) }

  fn set_archived(&mut self, id: PersonId, archived: bool) -> Result<()> {
    let category = self.category;
    let person = self.get_mut(id)?;
    if person.archived == archived {
      let state = if archived { ArchiveState::Archived } else { ArchiveState::Unarchived };
      return Err(Error::AlreadyInState {
        entity: category.into(),
        id: id.get(),
        state,
      });
    }
    person.archived = archived;
    Ok(())
  }

  /// Every person matching all `filters`, in id order.
  pub fn find(&self, filters: &[PersonFilter]) -> Vec<&Person> {
    self.persons.values().filter(|p| p.matches_all(filters)).collect()
  }

  /// Every person in id order, optionally leaving out archived ones.
  pub fn list(&self, include_archived: bool) -> Vec<&Person> {
    self
      .persons
      .values()
      .filter(|p| include_archived || !p.archived)
      .collect()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Person> + '_ { self.persons.values() }

  // ── Schedule access (scheduler only) ──────────────────────────────────────

  pub fn schedule(&self, id: PersonId) -> Result<&PersonalSchedule> {
    Ok(&self.get(id)?.schedule)
  }

  pub(crate) fn schedule_mut(&mut self, id: PersonId) -> Result<&mut PersonalSchedule> {
    Ok(&mut self.get_mut(id)?.schedule)
  }

  /// The appointment `id` holds at `time`, if any.
  pub fn appointment_at(&self, id: PersonId, time: TimeCode) -> Result<Option<AppointmentId>> {
    Ok(self.schedule(id)?.find_at(time))
  }
}

// ─── Appointments ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AppointmentRegistry {
  appointments: BTreeMap<AppointmentId, Appointment>,
  ids:          IdAllocator,
}

impl AppointmentRegistry {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize { self.appointments.len() }

  pub fn is_empty(&self) -> bool { self.appointments.is_empty() }

  pub fn cursor(&self) -> u32 { self.ids.cursor() }

  pub(crate) fn resume_from(&mut self, cursor: u32) {
    self.ids.observe(cursor.saturating_sub(1));
  }

  /// Assign an id, store the appointment, and return the stored copy.
  /// Availability must already have been checked.
  pub fn add(&mut self, mut appointment: Appointment) -> Result<&Appointment> {
    let appointments = &self.appointments;
    let raw = self
      .ids
      .next(|raw| appointments.contains_key(&AppointmentId::new(raw)))
      .ok_or(Error::IdsExhausted { entity: Entity::Appointment })?;
    let id = AppointmentId::new(raw);
    appointment.id = id;
    Ok(self.appointments.entry(id).or_insert(appointment))
  }

  /// Store an appointment that already carries its id (loading, or putting
  /// back an edited record).
  pub fn insert_with_id(&mut self, appointment: Appointment) -> Result<&Appointment> {
    let id = appointment.id;
    if !id.is_set() {
      return Err(Error::InvalidState(
        "cannot store an appointment without an id".to_string(),
      ));
    }
    if !IdAllocator::accepts(id.get()) {
      return Err(Error::InvalidState(format!("appointment id {id} is out of range")));
    }
    if self.appointments.contains_key(&id) {
      return Err(Error::IdInUse { entity: Entity::Appointment, id: id.get() });
    }
    self.ids.observe(id.get());
    Ok(self.appointments.entry(id).or_insert(appointment))
  }

  pub fn contains(&self, id: AppointmentId) -> bool { self.appointments.contains_key(&id) }

  pub fn get(&self, id: AppointmentId) -> Result<&Appointment> {
    self
      .appointments
      .get(&id)
      .ok_or_else(|| Error::not_found(Entity::Appointment, id.get()))
  }

  /// Remove and return the record so callers can cascade using its parties
  /// and time code.
  pub fn delete(&mut self, id: AppointmentId) -> Result<Appointment> {
    self
      .appointments
      .remove(&id)
      .ok_or_else(|| Error::not_found(Entity::Appointment, id.get()))
  }

  /// Every appointment in id order.
  pub fn iter(&self) -> impl Iterator<Item = &Appointment> + '_ { self.appointments.values() }
}
