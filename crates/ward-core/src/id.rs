//! Identifier newtypes and the allocator that issues them.
//!
//! Patients, staff and appointments each draw from their own allocator, so
//! patient 1 and staff 1 are unrelated. The value `0` is reserved for "not yet
//! assigned".
//!
//! Allocation policy: identifiers are strictly increasing and never reused.
//! The cursor only ever moves forward, so the id of a deleted record is gone
//! for good. The cursor is exported with every snapshot so the policy holds
//! across sessions too.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Newtypes ────────────────────────────────────────────────────────────────

/// Identifier of a patient or staff member within its own category.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(u32);

/// Identifier of an appointment in the global registry.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AppointmentId(u32);

impl PersonId {
  pub const UNSET: Self = Self(0);

  pub const fn new(raw: u32) -> Self { Self(raw) }

  pub const fn get(self) -> u32 { self.0 }

  pub const fn is_set(self) -> bool { self.0 != 0 }
}

impl AppointmentId {
  pub const UNSET: Self = Self(0);

  pub const fn new(raw: u32) -> Self { Self(raw) }

  pub const fn get(self) -> u32 { self.0 }

  pub const fn is_set(self) -> bool { self.0 != 0 }
}

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl fmt::Display for AppointmentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Allocator ───────────────────────────────────────────────────────────────

/// Hands out unique positive identifiers from a forward-only cursor.
///
/// Issued values stay below [`IdAllocator::LIMIT`], so the cursor (one past
/// the last issued value) always fits in a `u32`. A cursor at the limit means
/// the id space is used up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
  cursor: u32,
}

impl Default for IdAllocator {
  fn default() -> Self { Self { cursor: 1 } }
}

impl IdAllocator {
  /// Exclusive upper bound on issued and loaded identifiers.
  pub const LIMIT: u32 = u32::MAX;

  /// Whether `raw` can be stored as an identifier at all.
  pub fn accepts(raw: u32) -> bool { raw != 0 && raw < Self::LIMIT }

  /// The next value the allocator will consider; persist this to resume.
  pub fn cursor(&self) -> u32 { self.cursor }

  /// Return the smallest value at or past the cursor for which `in_use` is
  /// false, and move the cursor one past it. `None` once the space is used
  /// up; the cursor then stays at [`Self::LIMIT`].
  pub fn next(&mut self, in_use: impl Fn(u32) -> bool) -> Option<u32> {
    while self.cursor < Self::LIMIT && in_use(self.cursor) {
      self.cursor += 1;
    }
    if self.cursor >= Self::LIMIT {
      return None;
    }
    let id = self.cursor;
    self.cursor += 1;
    Some(id)
  }

  /// Record that `id` has been issued elsewhere (e.g. loaded from storage),
  /// so the cursor never hands it out again.
  pub fn observe(&mut self, id: u32) {
    let past = id.saturating_add(1).min(Self::LIMIT);
    if past > self.cursor {
      self.cursor = past;
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use super::*;

  #[test]
  fn starts_at_one() {
    let mut ids = IdAllocator::default();
    assert_eq!(ids.next(|_| false), Some(1));
    assert_eq!(ids.next(|_| false), Some(2));
    assert_eq!(ids.cursor(), 3);
  }

  #[test]
  fn skips_values_in_use() {
    let taken: BTreeSet<u32> = [1, 2, 4].into();
    let mut ids = IdAllocator::default();
    assert_eq!(ids.next(|id| taken.contains(&id)), Some(3));
    assert_eq!(ids.next(|id| taken.contains(&id)), Some(5));
  }

  #[test]
  fn freed_ids_are_not_reissued() {
    let mut live: BTreeSet<u32> = BTreeSet::new();
    let mut ids = IdAllocator::default();

    let a = ids.next(|id| live.contains(&id)).unwrap();
    live.insert(a);
    let b = ids.next(|id| live.contains(&id)).unwrap();
    live.insert(b);

    live.remove(&a);
    let c = ids.next(|id| live.contains(&id)).unwrap();
    assert_eq!((a, b, c), (1, 2, 3));
  }

  #[test]
  fn observe_moves_cursor_forward_only() {
    let mut ids = IdAllocator::default();
    ids.observe(4);
    ids.observe(2);
    assert_eq!(ids.cursor(), 5);
    ids.observe(9);
    assert_eq!(ids.cursor(), 10);
  }

  #[test]
  fn last_value_is_issued_once_then_exhausted() {
    let mut ids = IdAllocator::default();
    ids.observe(IdAllocator::LIMIT - 2);
    assert_eq!(ids.next(|_| false), Some(IdAllocator::LIMIT - 1));
    assert_eq!(ids.cursor(), IdAllocator::LIMIT);
    assert_eq!(ids.next(|_| false), None);
    assert_eq!(ids.next(|_| false), None);
    assert_eq!(ids.cursor(), IdAllocator::LIMIT);
  }

  #[test]
  fn observing_the_top_of_the_range_saturates() {
    let mut ids = IdAllocator::default();
    ids.observe(u32::MAX);
    assert_eq!(ids.cursor(), IdAllocator::LIMIT);
    assert_eq!(ids.next(|_| false), None);
  }

  #[test]
  fn accepts_only_the_usable_range() {
    assert!(!IdAllocator::accepts(0));
    assert!(IdAllocator::accepts(1));
    assert!(IdAllocator::accepts(u32::MAX - 1));
    assert!(!IdAllocator::accepts(u32::MAX));
  }
}
