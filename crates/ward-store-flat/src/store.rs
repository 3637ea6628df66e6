//! [`FlatStore`] — the flat-file implementation of [`SnapshotStore`].

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use tracing::{debug, info, warn};
use ward_core::{
  record::{LoadIssue, Snapshot, Table},
  store::{Loaded, SnapshotStore},
};

use crate::{
  Error, Result,
  encode::{
    Decoded, decode_appointment, decode_header, decode_person, encode_appointment,
    encode_header, encode_person,
  },
};

const PATIENTS: &str = "patients.txt";
const STAFF: &str = "staff.txt";
const APPOINTMENTS: &str = "appointments.txt";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Ward store kept as three text tables in one directory.
#[derive(Debug, Clone)]
pub struct FlatStore {
  dir: PathBuf,
}

impl FlatStore {
  /// Open (or create) a store rooted at `dir`.
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref().to_path_buf();
    tokio::fs::create_dir_all(&dir).await?;
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path { &self.dir }

  /// Read one table. A missing file is an empty table; unreadable records are
  /// skipped and reported, but an unreadable header fails the whole load.
  async fn read_table<R>(
    &self,
    file: &'static str,
    decode: fn(&str) -> Decoded<R>,
  ) -> Result<(Table<R>, Vec<LoadIssue>)> {
    let text = match tokio::fs::read_to_string(self.dir.join(file)).await {
      Ok(text) => text,
      Err(err) if err.kind() == ErrorKind::NotFound => {
        debug!(file, "no table file yet");
        return Ok((Table::default(), Vec::new()));
      }
      Err(err) => return Err(err.into()),
    };

    let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));
    let mut table = Table::default();
    let mut issues = Vec::new();

    match lines.next() {
      None => return Ok((table, issues)),
      Some((line, header)) => {
        table.next_id = decode_header(header)
          .map_err(|reason| Error::Malformed { file, line, reason })?;
      }
    }

    for (line, content) in lines {
      if content.trim().is_empty() {
        continue;
      }
      match decode(content) {
        Ok(record) => table.records.push(record),
        Err(reason) => {
          warn!(file, line, %reason, "skipping unreadable record");
          issues.push(LoadIssue { source: format!("{file}:{line}"), message: reason });
        }
      }
    }

    Ok((table, issues))
  }

  /// Write one table to a temporary sibling, then rename it into place.
  async fn write_table<R>(
    &self,
    file: &'static str,
    table: &Table<R>,
    encode: fn(&R) -> String,
  ) -> Result<()> {
    let mut text = encode_header(table.next_id);
    text.push('\n');
    for record in &table.records {
      text.push_str(&encode(record));
      text.push('\n');
    }

    let target = self.dir.join(file);
    let staging = self.dir.join(format!("{file}.tmp"));
    tokio::fs::write(&staging, text).await?;
    tokio::fs::rename(&staging, &target).await?;
    debug!(file, records = table.records.len(), "table written");
    Ok(())
  }
}

// ─── SnapshotStore impl ──────────────────────────────────────────────────────

impl SnapshotStore for FlatStore {
  type Error = Error;

  async fn load(&self) -> Result<Loaded> {
    let (patients, mut issues) = self.read_table(PATIENTS, decode_person).await?;
    let (staff, staff_issues) = self.read_table(STAFF, decode_person).await?;
    let (appointments, appointment_issues) =
      self.read_table(APPOINTMENTS, decode_appointment).await?;
    issues.extend(staff_issues);
    issues.extend(appointment_issues);

    info!(
      dir = %self.dir.display(),
      patients = patients.records.len(),
      staff = staff.records.len(),
      appointments = appointments.records.len(),
      skipped = issues.len(),
      "store loaded"
    );

    Ok(Loaded {
      snapshot: Snapshot { patients, staff, appointments },
      issues,
    })
  }

  async fn save(&self, snapshot: &Snapshot) -> Result<()> {
    self.write_table(PATIENTS, &snapshot.patients, encode_person).await?;
    self.write_table(STAFF, &snapshot.staff, encode_person).await?;
    self
      .write_table(APPOINTMENTS, &snapshot.appointments, encode_appointment)
      .await?;
    info!(dir = %self.dir.display(), "store saved");
    Ok(())
  }
}
