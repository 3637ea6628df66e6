//! Core types and the scheduling engine for the Ward clinic roster.
//!
//! This crate is deliberately free of file-system and terminal dependencies.
//! It owns patients, staff and the appointments that bind them, and keeps the
//! global appointment registry and every person's private schedule in step.
//! Persistence backends implement [`store::SnapshotStore`]; the command layer
//! talks to [`scheduler::Scheduler`] directly or through [`request::Request`].

pub mod appointment;
pub mod error;
pub mod id;
pub mod person;
pub mod record;
pub mod registry;
pub mod request;
pub mod schedule;
pub mod scheduler;
pub mod store;

pub use error::{Error, Result};
pub use scheduler::Scheduler;
