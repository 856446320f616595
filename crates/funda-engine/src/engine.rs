//! The per-turn state machine.
//!
//! A turn runs: validate, window the prior history, persist the user
//! message, fetch curriculum for the request's grade and subject,
//! invoke the completion, persist the assistant message, bump progress
//! counters.
//! Quick actions skip the user-message and history steps and leave the
//! counters alone. A persisted user turn is never rolled back when the
//! completion step fails; the record shows the unanswered question.

use std::sync::Arc;

use tracing::{info, warn};

use funda_bedrock::chat::{self, Completion, ImageKind, ImageRef};
use funda_bedrock::context;
use funda_bedrock::extract::extraction_placeholder;
use funda_bedrock::prompt::QuickActionKind;
use funda_core::models::curriculum::{CurriculumDocument, NewCurriculumDocument};
use funda_core::models::grade::Grade;
use funda_core::models::message::{MediaKind, MediaRef, Message, NewMessage, Role};
use funda_core::models::session::{Session, SessionPatch};
use funda_core::models::subject::Subject;
use funda_store::conversations::ConversationStore;
use funda_store::documents::DocumentIndex;

use crate::config::TutorConfig;
use crate::error::EngineError;

/// One incoming chat turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub session_id: String,
    pub message: String,
    pub grade: Grade,
    pub subject: Subject,
    pub media: Option<MediaRef>,
}

/// Result of a completed turn: the persisted assistant message and its
/// raw text.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub message: Message,
    pub response: String,
}

/// Fields for registering an uploaded curriculum document. The binary
/// itself stays with the upload collaborator; only the extracted text
/// and metadata reach the core.
#[derive(Debug, Clone)]
pub struct RegisterDocument {
    pub file_name: String,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub grade: Grade,
    pub subject: Subject,
    pub description: Option<String>,
    /// Extracted plain text; `None` or empty when extraction was not
    /// possible, in which case a placeholder is recorded.
    pub extracted_text: Option<String>,
}

/// Top-level coordinator for tutoring conversations.
pub struct TutorEngine<C: Completion> {
    store: Arc<ConversationStore>,
    index: Arc<DocumentIndex>,
    completion: C,
    config: TutorConfig,
}

impl<C: Completion> TutorEngine<C> {
    pub fn new(
        store: Arc<ConversationStore>,
        index: Arc<DocumentIndex>,
        completion: C,
        config: TutorConfig,
    ) -> Self {
        Self {
            store,
            index,
            completion,
            config,
        }
    }

    // ── Sessions ─────────────────────────────────────────────────────────────

    pub async fn create_session(&self, grade: Grade, subject: Subject) -> Session {
        self.store.create_session(grade, subject).await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Session, EngineError> {
        self.store
            .get_session(session_id)
            .await
            .ok_or_else(|| EngineError::UnknownSession(session_id.to_string()))
    }

    /// Change the session's current grade and/or subject. Future turns
    /// use the new values; past messages keep their snapshots.
    pub async fn patch_session(
        &self,
        session_id: &str,
        patch: SessionPatch,
    ) -> Result<Session, EngineError> {
        self.store
            .update_session(session_id, patch)
            .await
            .ok_or_else(|| EngineError::UnknownSession(session_id.to_string()))
    }

    pub async fn list_messages(&self, session_id: &str) -> Vec<Message> {
        self.store.list_messages(session_id).await
    }

    // ── Turns ────────────────────────────────────────────────────────────────

    /// Run one question/answer turn.
    pub async fn send_turn(&self, request: TurnRequest) -> Result<TurnOutcome, EngineError> {
        let text = request.message.trim();
        if text.is_empty() && request.media.is_none() {
            return Err(EngineError::InvalidTurn(
                "a turn needs message text or a media attachment".to_string(),
            ));
        }
        // Sessions are never created implicitly.
        self.get_session(&request.session_id).await?;

        let content = match (&request.media, text.is_empty()) {
            (Some(media), true) => format!("[{} content shared]", media.kind.as_str()),
            _ => text.to_string(),
        };

        // The model history stops before this turn; the turn itself is
        // sent as the final user message of the completion request.
        // Sending it in both places would break the Converse API's
        // user/assistant alternation requirement.
        let prior = self.store.list_messages(&request.session_id).await;
        let history = context::window_history(&prior, self.config.context_window);

        self.store
            .append_message(NewMessage {
                session_id: request.session_id.clone(),
                role: Role::User,
                content,
                grade: request.grade,
                subject: request.subject,
                media: request.media.clone(),
            })
            .await?;

        let documents = self
            .index
            .find_active(request.grade, request.subject)
            .await;

        let image = request.media.as_ref().and_then(|m| match m.kind {
            MediaKind::Image => Some(ImageRef::S3 {
                uri: m.url.clone(),
                kind: ImageKind::from_url(&m.url),
            }),
            _ => None,
        });

        let question = if image.is_some() {
            if text.is_empty() {
                format!(
                    "Please analyze this image and help me understand it in the context \
                     of Grade {} {}.",
                    request.grade, request.subject
                )
            } else {
                format!("{text} [User shared an image for analysis]")
            }
        } else if text.is_empty() {
            "Please help me with this content.".to_string()
        } else {
            text.to_string()
        };

        let response = match chat::answer_question(
            &self.completion,
            &question,
            request.grade,
            request.subject,
            &documents,
            history,
            image,
            self.config.answer_max_tokens,
            self.config.temperature,
        )
        .await
        {
            Ok(text) => text,
            Err(e) => {
                // The user turn stays persisted: the record shows the
                // question was asked and the answer failed.
                warn!(session_id = %request.session_id, error = %e, "completion failed");
                return Err(e.into());
            }
        };

        let assistant = self
            .store
            .append_message(NewMessage {
                session_id: request.session_id.clone(),
                role: Role::Assistant,
                content: response.clone(),
                grade: request.grade,
                subject: request.subject,
                media: None,
            })
            .await?;

        self.store
            .increment_question_count(&request.session_id)
            .await?;
        self.store
            .add_study_minutes(&request.session_id, self.config.study_minutes_per_turn)
            .await?;

        info!(
            session_id = %request.session_id,
            grade = %request.grade,
            subject = %request.subject,
            "turn complete"
        );

        Ok(TurnOutcome {
            message: assistant,
            response,
        })
    }

    /// Run one of the canned quick actions. No user message is
    /// persisted, no history is sent, and progress counters are
    /// untouched; only the assistant output lands in the store.
    pub async fn quick_action(
        &self,
        kind: QuickActionKind,
        session_id: &str,
        last_topic: &str,
        grade: Grade,
        subject: Subject,
    ) -> Result<String, EngineError> {
        self.get_session(session_id).await?;

        let documents = self.index.find_active(grade, subject).await;
        let response = chat::quick_action(
            &self.completion,
            kind,
            last_topic,
            grade,
            subject,
            &documents,
            self.config.quick_max_tokens,
            self.config.temperature,
        )
        .await?;

        self.store
            .append_message(NewMessage {
                session_id: session_id.to_string(),
                role: Role::Assistant,
                content: response.clone(),
                grade,
                subject,
                media: None,
            })
            .await?;

        info!(session_id, ?kind, "quick action complete");

        Ok(response)
    }

    // ── Curriculum ───────────────────────────────────────────────────────────

    /// Register an uploaded curriculum document. A missing or empty
    /// extraction result records a placeholder rather than blocking
    /// registration.
    pub async fn register_document(&self, register: RegisterDocument) -> CurriculumDocument {
        let content = match register.extracted_text {
            Some(text) if !text.trim().is_empty() => text,
            _ => extraction_placeholder(&register.original_name, &register.mime_type),
        };

        self.index
            .insert(NewCurriculumDocument {
                file_name: register.file_name,
                original_name: register.original_name,
                file_type: register.mime_type,
                file_size: register.size_bytes,
                grade: register.grade,
                subject: register.subject,
                description: register.description,
                content,
            })
            .await
    }

    /// Active documents for a (grade, subject) pair, or all active
    /// documents when no filter is given.
    pub async fn list_curriculum(
        &self,
        filter: Option<(Grade, Subject)>,
    ) -> Vec<CurriculumDocument> {
        match filter {
            Some((grade, subject)) => self.index.find_active(grade, subject).await,
            None => self.index.find_all_active().await,
        }
    }

    pub async fn deactivate_document(&self, id: i64) -> bool {
        self.index.deactivate(id).await
    }

    pub async fn get_document(&self, id: i64) -> Option<CurriculumDocument> {
        self.index.get(id).await
    }
}
