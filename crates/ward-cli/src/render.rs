//! Turning a [`Response`] into terminal output.

use anyhow::Result;
use ward_core::{
  record::{AppointmentRecord, PersonRecord},
  request::Response,
};

use crate::time::format_time;

pub fn render(response: &Response, subject: &str, json: bool) -> Result<String> {
  if json {
    return Ok(serde_json::to_string_pretty(response)?);
  }

  let text = match response {
    Response::PersonAdded(id) => format!("Added {subject} {id}."),
    Response::Person(record) => person_card(record),
    Response::PersonDeleted { id, cascaded } => {
      let mut out = format!("Deleted {subject} {id}.");
      if !cascaded.is_empty() {
        out.push_str(&format!(
          " Cancelled {} appointment(s):\n{}",
          cascaded.len(),
          appointment_table(cascaded)
        ));
      }
      out
    }
    Response::Persons(records) if records.is_empty() => format!("No {subject} found."),
    Response::Persons(records) => person_table(records),
    Response::ArchiveChanged { id, archived: true } => format!("Archived {subject} {id}."),
    Response::ArchiveChanged { id, archived: false } => format!("Unarchived {subject} {id}."),
    Response::AppointmentAdded(id) => format!("Booked appointment {id}."),
    Response::Appointment(record) => appointment_card(record),
    Response::AppointmentDeleted(record) => format!(
      "Cancelled appointment {} at {}.",
      record.id,
      format_time(record.time)
    ),
    Response::Appointments(records) if records.is_empty() => "No appointments.".to_string(),
    Response::Appointments(records) => appointment_table(records),
  };
  Ok(text)
}

// ─── Cards ───────────────────────────────────────────────────────────────────

fn person_card(record: &PersonRecord) -> String {
  let d = &record.details;
  let mut out = format!(
    "#{}  {}\n  IC:      {}\n  Phone:   {}\n  Email:   {}\n  Address: {}",
    record.id, d.name, d.ic_number, d.phone, d.email, d.address
  );
  if record.archived {
    out.push_str("\n  (archived)");
  }
  out
}

fn appointment_card(record: &AppointmentRecord) -> String {
  format!(
    "#{}  {}\n  Patient:  {}\n  Staff:    {}\n  Reason:   {}\n  Location: {}",
    record.id,
    format_time(record.time),
    record.patient_id,
    record.staff_id,
    record.reason.as_deref().unwrap_or("-"),
    record.location.as_deref().unwrap_or("-"),
  )
}

// ─── Tables ──────────────────────────────────────────────────────────────────

fn person_table(records: &[PersonRecord]) -> String {
  let rows = records
    .iter()
    .map(|r| {
      let d = &r.details;
      let name = if r.archived { format!("{} (archived)", d.name) } else { d.name.clone() };
      vec![
        r.id.to_string(),
        name,
        d.ic_number.clone(),
        d.phone.clone(),
        d.email.clone(),
      ]
    })
    .collect();
  table(&["ID", "NAME", "IC", "PHONE", "EMAIL"], rows)
}

fn appointment_table(records: &[AppointmentRecord]) -> String {
  let rows = records
    .iter()
    .map(|r| {
      vec![
        r.id.to_string(),
        format_time(r.time),
        r.patient_id.to_string(),
        r.staff_id.to_string(),
        r.reason.clone().unwrap_or_default(),
        r.location.clone().unwrap_or_default(),
      ]
    })
    .collect();
  table(&["ID", "TIME", "PATIENT", "STAFF", "REASON", "LOCATION"], rows)
}

/// Left-aligned columns, two spaces apart, no trailing padding.
fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
  let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
  for row in &rows {
    for (width, cell) in widths.iter_mut().zip(row) {
      *width = (*width).max(cell.chars().count());
    }
  }

  let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
  std::iter::once(header)
    .chain(rows)
    .map(|row| {
      let line = row
        .iter()
        .zip(&widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
      line.trim_end().to_string()
    })
    .collect::<Vec<_>>()
    .join("\n")
}
