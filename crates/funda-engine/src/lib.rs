//! funda-engine
//!
//! The session orchestrator: receives a turn, persists the user
//! message, assembles grounded context, invokes the completion
//! capability, persists the assistant message, and updates progress
//! counters. Also owns the session and curriculum boundary operations
//! the transport layer exposes.

pub mod config;
pub mod engine;
pub mod error;
