//! Flat-file backend for the Ward scheduler.
//!
//! Keeps one plain-text table per collection in a data directory and moves
//! whole [`ward_core::record::Snapshot`]s in and out of it with `tokio::fs`.

mod encode;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FlatStore;

#[cfg(test)]
mod tests;
