//! funda-core
//!
//! Pure domain types for the Funda tutoring backend: grades, subjects,
//! sessions, messages, and curriculum documents.
//! No AWS dependency — this is the shared vocabulary of the system.

pub mod error;
pub mod models;
