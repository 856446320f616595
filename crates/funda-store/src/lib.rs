//! funda-store
//!
//! In-memory conversation and curriculum state for the tutoring
//! backend. Sessions and their histories live behind per-session locks
//! so concurrent turns on one session serialize while distinct sessions
//! proceed in parallel. The whole store can be exported to and restored
//! from a JSON snapshot.

pub mod conversations;
pub mod documents;
pub mod error;
pub mod snapshot;
