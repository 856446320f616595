//! Context assembly for chat turns.
//!
//! Two pieces: the curriculum grounding block appended to the system
//! prompt, and the bounded history window passed to the completion
//! call.

use funda_core::models::curriculum::CurriculumDocument;
use funda_core::models::grade::Grade;
use funda_core::models::message::{Message, Role};
use funda_core::models::subject::Subject;

use crate::chat::ChatMessage;

/// How much of each document's extracted text is quoted in the
/// grounding block.
pub const GROUNDING_EXCERPT_CHARS: usize = 500;

/// Label used when a document has no description.
const GENERIC_DESCRIPTION: &str = "School curriculum material";

/// Build the grounding block from the active curriculum documents for
/// a (grade, subject) pair. Empty when there are no documents.
///
/// Each document contributes its display name, description (or a
/// generic label), and the first [`GROUNDING_EXCERPT_CHARS`] characters
/// of its extracted text with an ellipsis marker. The block instructs
/// the model to prioritize this material over generic curriculum
/// guidance.
pub fn build_grounding_block(
    grade: Grade,
    subject: Subject,
    documents: &[CurriculumDocument],
) -> String {
    if documents.is_empty() {
        return String::new();
    }

    let mut block = format!(
        "\n\nSCHOOL-SPECIFIC CURRICULUM MATERIALS:\n\
         You have access to the following curriculum documents for Grade {grade} {subject}:\n"
    );

    for document in documents {
        let description = document
            .description
            .as_deref()
            .unwrap_or(GENERIC_DESCRIPTION);
        let excerpt: String = document
            .content
            .chars()
            .take(GROUNDING_EXCERPT_CHARS)
            .collect();
        block.push_str(&format!(
            "\n- {}: {}\nContent excerpt: {}...\n",
            document.original_name, description, excerpt
        ));
    }

    block.push_str(
        "\nIMPORTANT: Use these school-specific materials as your primary reference. \
         Align your responses with the teaching methods, examples, and approaches \
         outlined in these documents. When the school curriculum provides specific \
         guidance, prioritize it over general CAPS guidelines.",
    );

    block
}

/// Bounded conversation history for a completion call: the last
/// `window` messages in chronological order, mapped to the two-valued
/// role enum the model consumes.
///
/// The Converse API requires conversations to open with a user message,
/// so when the window cuts into the middle of an exchange the leading
/// assistant entries are dropped. Callers pass the history *before* the
/// current turn; the turn itself travels as the final user message of
/// the request.
///
/// Media-only messages are real turns; they are carried through with
/// whatever content string was persisted for them, never dropped.
pub fn window_history(messages: &[Message], window: usize) -> Vec<ChatMessage> {
    let start = messages.len().saturating_sub(window);
    let windowed = &messages[start..];
    let skip = windowed
        .iter()
        .take_while(|m| m.role == Role::Assistant)
        .count();
    windowed[skip..]
        .iter()
        .map(|m| ChatMessage {
            role: m.role,
            content: m.content.clone(),
        })
        .collect()
}
