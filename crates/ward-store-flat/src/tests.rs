//! Integration tests for `FlatStore` against a temporary directory.

use tempfile::TempDir;
use ward_core::{
  Scheduler,
  appointment::{AppointmentDraft, TimeCode},
  person::{Category, PersonDetails},
  record::Snapshot,
  store::SnapshotStore,
};

use crate::{Error, FlatStore};

async fn store() -> (TempDir, FlatStore) {
  let dir = tempfile::tempdir().expect("temp dir");
  let store = FlatStore::open(dir.path()).await.expect("open store");
  (dir, store)
}

fn details(name: &str) -> PersonDetails {
  PersonDetails {
    name:      name.into(),
    ic_number: format!("S000{name}"),
    phone:     "6000 0000".into(),
    email:     String::new(),
    address:   "12 Kent Ridge | Level 3\nWard B".into(),
  }
}

fn populated() -> Scheduler {
  let mut s = Scheduler::new();
  let p1 = s.add_patient(details("Pat")).unwrap();
  let p2 = s.add_patient(details("Peg")).unwrap();
  let st = s.add_staff(details("Sam")).unwrap();
  s.add_appointment(
    AppointmentDraft::new(p1, st, TimeCode::new(100))
      .with_reason("follow-up \\ review")
      .with_location("Room 4"),
  )
  .unwrap();
  let gone = s.add_appointment(AppointmentDraft::new(p2, st, TimeCode::new(200))).unwrap();
  s.delete_appointment(gone).unwrap();
  s.archive_person(Category::Patient, p2).unwrap();
  s
}

// ─── Round trips ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_directory_loads_as_empty_snapshot() {
  let (_dir, s) = store().await;
  let loaded = s.load().await.unwrap();
  assert_eq!(loaded.snapshot, Snapshot::default());
  assert!(loaded.issues.is_empty());
}

#[tokio::test]
async fn open_creates_missing_directories() {
  let dir = tempfile::tempdir().unwrap();
  let nested = dir.path().join("a").join("b");
  let s = FlatStore::open(&nested).await.unwrap();
  assert!(s.dir().is_dir());
}

#[tokio::test]
async fn saved_snapshot_loads_back_unchanged() {
  let (_dir, s) = store().await;
  let snapshot = populated().snapshot();

  s.save(&snapshot).await.unwrap();
  let loaded = s.load().await.unwrap();

  assert!(loaded.issues.is_empty());
  assert_eq!(loaded.snapshot, snapshot);
}

#[tokio::test]
async fn cursor_survives_so_deleted_ids_stay_retired() {
  let (_dir, s) = store().await;
  s.save(&populated().snapshot()).await.unwrap();

  let (mut restored, issues) = Scheduler::restore(s.load().await.unwrap().snapshot);
  assert!(issues.is_empty());
  restored.verify().unwrap();

  let patient = restored.list_persons(Category::Patient, false)[0].id();
  let staff = restored.list_persons(Category::Staff, false)[0].id();
  let id = restored
    .add_appointment(AppointmentDraft::new(patient, staff, TimeCode::new(300)))
    .unwrap();
  assert_eq!(id.get(), 3);
}

#[tokio::test]
async fn save_replaces_previous_contents() {
  let (dir, s) = store().await;
  s.save(&populated().snapshot()).await.unwrap();
  s.save(&Snapshot::default()).await.unwrap();

  let text = std::fs::read_to_string(dir.path().join("appointments.txt")).unwrap();
  assert_eq!(text, "#next 1\n");
  assert!(!dir.path().join("appointments.txt.tmp").exists());
}

#[tokio::test]
async fn file_layout_is_line_per_record() {
  let (dir, s) = store().await;
  s.save(&populated().snapshot()).await.unwrap();

  let text = std::fs::read_to_string(dir.path().join("appointments.txt")).unwrap();
  assert_eq!(text, "#next 3\n1 | 1 | 1 | 100 | follow-up \\\\ review | Room 4\n");

  let text = std::fs::read_to_string(dir.path().join("patients.txt")).unwrap();
  let lines: Vec<_> = text.lines().collect();
  assert_eq!(lines[0], "#next 3");
  assert!(lines[2].ends_with(" | H"));
  assert!(lines[2].contains("Kent Ridge \\| Level 3\\nWard B"));
}

// ─── Damaged files ───────────────────────────────────────────────────────────

#[tokio::test]
async fn bad_records_are_skipped_and_reported() {
  let (dir, s) = store().await;
  std::fs::write(
    dir.path().join("staff.txt"),
    "#next 4\n1 | S1 | Sam | 1 | s@x | here | S\n\nnot a record\n3 | S3 | Sue | 3 | u@x | there | Q\n",
  )
  .unwrap();

  let loaded = s.load().await.unwrap();

  assert_eq!(loaded.snapshot.staff.next_id, 4);
  assert_eq!(loaded.snapshot.staff.records.len(), 1);
  let sources: Vec<_> = loaded.issues.iter().map(|i| i.source.as_str()).collect();
  assert_eq!(sources, vec!["staff.txt:4", "staff.txt:5"]);
}

#[tokio::test]
async fn unreadable_header_fails_the_load() {
  let (dir, s) = store().await;
  std::fs::write(dir.path().join("patients.txt"), "1 | a | b | c | d | e | S\n").unwrap();

  let err = s.load().await.unwrap_err();
  assert!(matches!(err, Error::Malformed { file: "patients.txt", line: 1, .. }));
}

#[tokio::test]
async fn double_booking_in_files_is_caught_on_restore() {
  let (dir, s) = store().await;
  std::fs::write(
    dir.path().join("patients.txt"),
    "#next 3\n1 | A | Ann | 1 | | x | S\n2 | B | Ben | 2 | | y | S\n",
  )
  .unwrap();
  std::fs::write(dir.path().join("staff.txt"), "#next 2\n1 | C | Cal | 3 | | z | S\n").unwrap();
  std::fs::write(
    dir.path().join("appointments.txt"),
    "#next 3\n1 | 1 | 1 | 500 |  | \n2 | 2 | 1 | 500 |  | \n",
  )
  .unwrap();

  let loaded = s.load().await.unwrap();
  assert!(loaded.issues.is_empty());

  let (scheduler, issues) = Scheduler::restore(loaded.snapshot);
  assert_eq!(scheduler.appointment_registry().len(), 1);
  assert_eq!(issues.len(), 1);
  assert_eq!(issues[0].source, "appointment 2");
  scheduler.verify().unwrap();
}
