//! Person types shared by patients and staff.
//!
//! Both categories carry the same fields; the category is configuration on
//! the owning [`crate::registry::PersonRegistry`], not a separate type.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{id::PersonId, schedule::PersonalSchedule};

/// Which registry a person belongs to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Patient,
  Staff,
}

// ─── Details ─────────────────────────────────────────────────────────────────

/// The free-text attributes of a person. Validated upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDetails {
  pub name:      String,
  pub ic_number: String,
  pub phone:     String,
  pub email:     String,
  pub address:   String,
}

/// Partial person data for an edit. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonPatch {
  pub name:      Option<String>,
  pub ic_number: Option<String>,
  pub phone:     Option<String>,
  pub email:     Option<String>,
  pub address:   Option<String>,
}

impl PersonPatch {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

impl PersonDetails {
  /// Field-level upsert: every supplied field overwrites, the rest stay.
  pub fn apply(&mut self, patch: PersonPatch) {
    let PersonPatch { name, ic_number, phone, email, address } = patch;
    if let Some(v) = name {
      self.name = v;
    }
    if let Some(v) = ic_number {
      self.ic_number = v;
    }
    if let Some(v) = phone {
      self.phone = v;
    }
    if let Some(v) = email {
      self.email = v;
    }
    if let Some(v) = address {
      self.address = v;
    }
  }

  pub fn field(&self, field: PersonField) -> &str {
    match field {
      PersonField::Name => &self.name,
      PersonField::IcNumber => &self.ic_number,
      PersonField::Phone => &self.phone,
      PersonField::Email => &self.email,
      PersonField::Address => &self.address,
    }
  }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// A searchable person attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PersonField {
  Name,
  IcNumber,
  Phone,
  Email,
  Address,
}

/// Case-insensitive substring match against one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonFilter {
  pub field:  PersonField,
  pub needle: String,
}

impl PersonFilter {
  pub fn new(field: PersonField, needle: impl Into<String>) -> Self {
    Self { field, needle: needle.into() }
  }

  pub fn matches(&self, details: &PersonDetails) -> bool {
    details
      .field(self.field)
      .to_lowercase()
      .contains(&self.needle.trim().to_lowercase())
  }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// A patient or staff member, with their private schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
  pub(crate) id:       PersonId,
  pub details:         PersonDetails,
  pub(crate) archived: bool,
  pub(crate) schedule: PersonalSchedule,
}

impl Person {
  /// A new, unregistered person. The id is assigned by the registry.
  pub fn new(details: PersonDetails) -> Self {
    Self {
      id: PersonId::UNSET,
      details,
      archived: false,
      schedule: PersonalSchedule::new(),
    }
  }

  pub fn id(&self) -> PersonId { self.id }

  pub fn is_archived(&self) -> bool { self.archived }

  pub fn schedule(&self) -> &PersonalSchedule { &self.schedule }

  pub fn matches_all(&self, filters: &[PersonFilter]) -> bool {
    filters.iter().all(|f| f.matches(&self.details))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn alice() -> PersonDetails {
    PersonDetails {
      name:      "Alice Tan".into(),
      ic_number: "S1234567A".into(),
      phone:     "91234567".into(),
      email:     "alice@example.com".into(),
      address:   "1 Kent Ridge Road".into(),
    }
  }

  #[test]
  fn patch_only_overwrites_supplied_fields() {
    let mut d = alice();
    d.apply(PersonPatch {
      phone: Some("98765432".into()),
      ..Default::default()
    });
    assert_eq!(d.phone, "98765432");
    assert_eq!(d.name, "Alice Tan");
    assert_eq!(d.email, "alice@example.com");
  }

  #[test]
  fn filters_are_case_insensitive_substrings() {
    let person = Person::new(alice());
    assert!(person.matches_all(&[PersonFilter::new(PersonField::Name, "alice")]));
    assert!(person.matches_all(&[
      PersonFilter::new(PersonField::Name, "TAN"),
      PersonFilter::new(PersonField::Address, "kent"),
    ]));
    assert!(!person.matches_all(&[
      PersonFilter::new(PersonField::Name, "tan"),
      PersonFilter::new(PersonField::Email, "bob"),
    ]));
  }

  #[test]
  fn no_filters_match_everyone() {
    assert!(Person::new(PersonDetails::default()).matches_all(&[]));
  }

  #[test]
  fn category_labels() {
    assert_eq!(Category::Patient.to_string(), "patient");
    assert_eq!("staff".parse::<Category>().unwrap(), Category::Staff);
  }
}
