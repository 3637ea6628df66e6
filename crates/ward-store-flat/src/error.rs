//! Error type for `ward-store-flat`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  /// A file whose structure, not just one record, is unreadable.
  #[error("{file}:{line}: {reason}")]
  Malformed {
    file:   &'static str,
    line:   usize,
    reason: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
