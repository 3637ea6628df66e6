//! Line encoding for the flat tables.
//!
//! A table file starts with a `#next N` header carrying the allocator cursor.
//! Every other non-blank line is one record whose fields are joined by
//! ` | `. Inside a field, `\\`, `\|` and `\n` stand for a backslash, a pipe
//! and a line break, so free text never splits a record.
//!
//! Decoders return a plain reason string; the caller knows the file and line
//! number and turns it into a load issue.

use std::str::FromStr;

use ward_core::{
  appointment::TimeCode,
  id::{AppointmentId, PersonId},
  person::PersonDetails,
  record::{AppointmentRecord, PersonRecord},
};

const SEPARATOR: &str = " | ";
const HEADER: &str = "#next ";

pub type Decoded<T> = std::result::Result<T, String>;

// ─── Fields ──────────────────────────────────────────────────────────────────

pub fn escape(field: &str) -> String {
  let mut out = String::with_capacity(field.len());
  for c in field.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '|' => out.push_str("\\|"),
      '\n' => out.push_str("\\n"),
      c => out.push(c),
    }
  }
  out
}

/// Split a record on unescaped pipes and undo the escapes.
///
/// The single space on each side of a separator belongs to the separator, so
/// it is stripped by position; any other whitespace is field content.
pub fn split_fields(line: &str) -> Decoded<Vec<String>> {
  let mut raw = vec![String::new()];
  let mut chars = line.chars();
  while let Some(c) = chars.next() {
    match c {
      '\\' => {
        let field = raw.last_mut().ok_or("empty record")?;
        match chars.next() {
          Some('\\') => field.push('\\'),
          Some('|') => field.push('|'),
          Some('n') => field.push('\n'),
          Some(other) => return Err(format!("unknown escape \\{other}")),
          None => return Err("dangling backslash at end of line".to_string()),
        }
      }
      '|' => raw.push(String::new()),
      c => {
        if let Some(field) = raw.last_mut() {
          field.push(c);
        }
      }
    }
  }

  let last = raw.len() - 1;
  Ok(
    raw
      .into_iter()
      .enumerate()
      .map(|(i, mut field)| {
        if i < last && field.ends_with(' ') {
          field.pop();
        }
        if i > 0 && field.starts_with(' ') {
          field.remove(0);
        }
        field
      })
      .collect(),
  )
}

fn join_fields<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
  fields.into_iter().map(escape).collect::<Vec<_>>().join(SEPARATOR)
}

fn parse_number<T: FromStr>(what: &str, field: &str) -> Decoded<T> {
  field
    .trim()
    .parse()
    .map_err(|_| format!("{what} is not a number: {field:?}"))
}

fn expect_fields(fields: &[String], count: usize, kind: &str) -> Decoded<()> {
  if fields.len() == count {
    Ok(())
  } else {
    Err(format!("{kind} line has {} fields, expected {count}", fields.len()))
  }
}

fn optional(field: String) -> Option<String> {
  if field.is_empty() { None } else { Some(field) }
}

// ─── Header ──────────────────────────────────────────────────────────────────

pub fn encode_header(next_id: u32) -> String { format!("{HEADER}{next_id}") }

pub fn decode_header(line: &str) -> Decoded<u32> {
  let rest = line
    .strip_prefix(HEADER)
    .ok_or_else(|| format!("expected a `{HEADER}N` header"))?;
  parse_number("next id", rest)
}

// ─── Persons ─────────────────────────────────────────────────────────────────

pub fn encode_person(record: &PersonRecord) -> String {
  let id = record.id.to_string();
  let d = &record.details;
  let state = if record.archived { "H" } else { "S" };
  join_fields([
    id.as_str(),
    d.ic_number.as_str(),
    d.name.as_str(),
    d.phone.as_str(),
    d.email.as_str(),
    d.address.as_str(),
    state,
  ])
}

pub fn decode_person(line: &str) -> Decoded<PersonRecord> {
  let fields = split_fields(line)?;
  expect_fields(&fields, 7, "person")?;
  let mut fields = fields.into_iter();
  let mut next = || fields.next().unwrap_or_default();

  let id = PersonId::new(parse_number("person id", &next())?);
  let ic_number = next();
  let name = next();
  let phone = next();
  let email = next();
  let address = next();
  let archived = match next().as_str() {
    "S" => false,
    "H" => true,
    other => return Err(format!("visibility must be S or H, got {other:?}")),
  };

  Ok(PersonRecord {
    id,
    details: PersonDetails { name, ic_number, phone, email, address },
    archived,
  })
}

// ─── Appointments ────────────────────────────────────────────────────────────

pub fn encode_appointment(record: &AppointmentRecord) -> String {
  let id = record.id.to_string();
  let patient = record.patient_id.to_string();
  let staff = record.staff_id.to_string();
  let time = record.time.to_string();
  join_fields([
    id.as_str(),
    patient.as_str(),
    staff.as_str(),
    time.as_str(),
    record.reason.as_deref().unwrap_or_default(),
    record.location.as_deref().unwrap_or_default(),
  ])
}

pub fn decode_appointment(line: &str) -> Decoded<AppointmentRecord> {
  let fields = split_fields(line)?;
  expect_fields(&fields, 6, "appointment")?;
  let mut fields = fields.into_iter();
  let mut next = || fields.next().unwrap_or_default();

  Ok(AppointmentRecord {
    id:         AppointmentId::new(parse_number("appointment id", &next())?),
    patient_id: PersonId::new(parse_number("patient id", &next())?),
    staff_id:   PersonId::new(parse_number("staff id", &next())?),
    time:       TimeCode::new(parse_number("time code", &next())?),
    reason:     optional(next()),
    location:   optional(next()),
  })
}
