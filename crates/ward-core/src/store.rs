//! The `SnapshotStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `ward-store-flat`).
//! The command layer depends on this abstraction, not on any concrete
//! backend. Backends only move [`Snapshot`]s; every business check happens in
//! [`crate::Scheduler::restore`], so a hand-edited store file cannot slip a
//! double-booking past the scheduler.

use std::future::Future;

use crate::record::{LoadIssue, Snapshot};

/// What a backend hands back from [`SnapshotStore::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loaded {
  pub snapshot: Snapshot,
  /// Stored entries the backend could not decode and skipped.
  pub issues:   Vec<LoadIssue>,
}

/// Abstraction over a persistence backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait SnapshotStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the last saved state. A store that has never been saved loads as
  /// an empty snapshot.
  fn load(&self) -> impl Future<Output = Result<Loaded, Self::Error>> + Send + '_;

  /// Replace the stored state with `snapshot`.
  fn save<'a>(
    &'a self,
    snapshot: &'a Snapshot,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
