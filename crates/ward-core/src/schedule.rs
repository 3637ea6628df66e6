//! [`PersonalSchedule`] — one person's appointments, keyed by time code.
//!
//! This is the authority for "is this person free at time T". It holds a copy
//! of every appointment the person takes part in; the scheduler keeps those
//! copies identical to the ones in the appointment registry.

use std::collections::BTreeMap;

use crate::{
  Error, Result,
  appointment::{Appointment, TimeCode},
  id::AppointmentId,
};

/// Which appointments to return from [`PersonalSchedule::filtered`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeFilter {
  #[default]
  All,
  /// Strictly earlier than the given time code.
  Before(TimeCode),
  /// Strictly later than the given time code.
  After(TimeCode),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalSchedule {
  slots: BTreeMap<TimeCode, Appointment>,
}

impl PersonalSchedule {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize { self.slots.len() }

  pub fn is_empty(&self) -> bool { self.slots.is_empty() }

  /// Admit `appointment` at its time code.
  pub fn add(&mut self, appointment: Appointment) -> Result<()> {
    if !appointment.id.is_set() {
      return Err(Error::InvalidState(
        "appointment id is not set".to_string(),
      ));
    }
    if let Some(occupant) = self.slots.get(&appointment.time) {
      return Err(Error::SlotOccupied {
        time:     appointment.time,
        occupant: occupant.id,
      });
    }
    self.slots.insert(appointment.time, appointment);
    Ok(())
  }

  /// The id of the appointment occupying `time`, or `None` if the slot is
  /// free. Never mutates.
  pub fn find_at(&self, time: TimeCode) -> Option<AppointmentId> {
    self.slots.get(&time).map(|a| a.id)
  }

  pub fn get(&self, time: TimeCode) -> Option<&Appointment> { self.slots.get(&time) }

  /// Remove and return the appointment occupying `time`.
  pub fn remove_at(&mut self, time: TimeCode) -> Result<Appointment> {
    self.slots.remove(&time).ok_or(Error::NoAppointmentAt(time))
  }

  /// All appointments in ascending time-code order. Restartable: each call
  /// yields a fresh iterator over the current contents.
  pub fn iter(&self) -> impl Iterator<Item = &Appointment> + '_ { self.slots.values() }

  /// Appointment ids in ascending time-code order.
  pub fn ids(&self) -> Vec<AppointmentId> { self.iter().map(|a| a.id).collect() }

  pub fn filtered(&self, filter: TimeFilter) -> Vec<&Appointment> {
    use std::ops::Bound::{Excluded, Unbounded};

    let range = match filter {
      TimeFilter::All => (Unbounded, Unbounded),
      TimeFilter::Before(t) => (Unbounded, Excluded(t)),
      TimeFilter::After(t) => (Excluded(t), Unbounded),
    };
    self.slots.range(range).map(|(_, a)| a).collect()
  }
}

impl<'a> IntoIterator for &'a PersonalSchedule {
  type Item = &'a Appointment;
  type IntoIter = std::collections::btree_map::Values<'a, TimeCode, Appointment>;

  fn into_iter(self) -> Self::IntoIter { self.slots.values() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::id::PersonId;

  fn appt(id: u32, time: u32) -> Appointment {
    Appointment {
      id:         AppointmentId::new(id),
      patient_id: PersonId::new(1),
      staff_id:   PersonId::new(1),
      time:       TimeCode::new(time),
      reason:     None,
      location:   None,
    }
  }

  #[test]
  fn add_then_find() {
    let mut s = PersonalSchedule::new();
    s.add(appt(1, 100)).unwrap();
    assert_eq!(s.find_at(TimeCode::new(100)), Some(AppointmentId::new(1)));
    assert_eq!(s.find_at(TimeCode::new(101)), None);
  }

  #[test]
  fn rejects_second_appointment_in_same_slot() {
    let mut s = PersonalSchedule::new();
    s.add(appt(1, 100)).unwrap();
    let err = s.add(appt(2, 100)).unwrap_err();
    assert_eq!(err, Error::SlotOccupied {
      time:     TimeCode::new(100),
      occupant: AppointmentId::new(1),
    });
    assert_eq!(s.len(), 1);
  }

  #[test]
  fn rejects_unassigned_id() {
    let mut s = PersonalSchedule::new();
    let err = s.add(appt(0, 100)).unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
    assert!(s.is_empty());
  }

  #[test]
  fn remove_missing_slot_is_not_found() {
    let mut s = PersonalSchedule::new();
    let err = s.remove_at(TimeCode::new(5)).unwrap_err();
    assert_eq!(err, Error::NoAppointmentAt(TimeCode::new(5)));
  }

  #[test]
  fn iterates_in_time_order_and_is_restartable() {
    let mut s = PersonalSchedule::new();
    s.add(appt(3, 300)).unwrap();
    s.add(appt(1, 100)).unwrap();
    s.add(appt(2, 200)).unwrap();

    let first: Vec<u32> = s.iter().map(|a| a.time.get()).collect();
    let second: Vec<u32> = (&s).into_iter().map(|a| a.time.get()).collect();
    assert_eq!(first, vec![100, 200, 300]);
    assert_eq!(first, second);
  }

  #[test]
  fn filters_are_strict() {
    let mut s = PersonalSchedule::new();
    for (id, t) in [(1, 100), (2, 200), (3, 300)] {
      s.add(appt(id, t)).unwrap();
    }

    let before: Vec<u32> = s
      .filtered(TimeFilter::Before(TimeCode::new(200)))
      .iter()
      .map(|a| a.id.get())
      .collect();
    let after: Vec<u32> = s
      .filtered(TimeFilter::After(TimeCode::new(200)))
      .iter()
      .map(|a| a.id.get())
      .collect();

    assert_eq!(before, vec![1]);
    assert_eq!(after, vec![3]);
    assert_eq!(s.filtered(TimeFilter::All).len(), 3);
  }
}
