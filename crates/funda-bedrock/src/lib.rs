//! funda-bedrock
//!
//! The model-facing half of the tutoring backend: system prompt
//! composition, curriculum grounding and history windowing, the
//! Converse-based completion client, and document text extraction.

pub mod chat;
pub mod context;
pub mod error;
pub mod extract;
pub mod prompt;
