//! Session and message storage.
//!
//! Each session's record and ordered history sit behind their own
//! `tokio::sync::Mutex`, held in a `RwLock`ed map keyed by session id.
//! All reads and writes for one session take that lock, so an append
//! can never interleave with a counter increment on the same session.
//! Messages are append-only; ids come from a store-wide monotonically
//! increasing counter while chronological order within a session is
//! authoritative for display and context windowing.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use funda_core::models::grade::Grade;
use funda_core::models::message::{Message, NewMessage};
use funda_core::models::session::{Session, SessionPatch};
use funda_core::models::subject::Subject;

use crate::error::StorageError;

struct SessionState {
    session: Session,
    messages: Vec<Message>,
}

/// Store of sessions and their ordered message histories.
pub struct ConversationStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionState>>>>,
    next_message_id: AtomicI64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_message_id: AtomicI64::new(1),
        }
    }

    async fn slot(&self, session_id: &str) -> Option<Arc<Mutex<SessionState>>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Create a fresh session with zeroed progress counters.
    pub async fn create_session(&self, grade: Grade, subject: Subject) -> Session {
        let now = jiff::Timestamp::now();
        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            current_grade: grade,
            current_subject: subject,
            questions_asked: 0,
            study_time_minutes: 0,
            created_at: now,
            updated_at: now,
        };

        let state = SessionState {
            session: session.clone(),
            messages: Vec::new(),
        };
        self.sessions
            .write()
            .await
            .insert(session.session_id.clone(), Arc::new(Mutex::new(state)));

        info!(
            session_id = %session.session_id,
            grade = %grade,
            subject = %subject,
            "created session"
        );

        session
    }

    pub async fn get_session(&self, session_id: &str) -> Option<Session> {
        let slot = self.slot(session_id).await?;
        let state = slot.lock().await;
        Some(state.session.clone())
    }

    /// Merge the patch into the session, refreshing `updated_at`.
    /// Returns `None` when the session id is unknown.
    pub async fn update_session(
        &self,
        session_id: &str,
        patch: SessionPatch,
    ) -> Option<Session> {
        let slot = self.slot(session_id).await?;
        let mut state = slot.lock().await;
        if let Some(grade) = patch.grade {
            state.session.current_grade = grade;
        }
        if let Some(subject) = patch.subject {
            state.session.current_subject = subject;
        }
        state.session.updated_at = jiff::Timestamp::now();
        Some(state.session.clone())
    }

    /// Append a message to the session's history, assigning its id and
    /// timestamp. The session record must already exist.
    pub async fn append_message(&self, new: NewMessage) -> Result<Message, StorageError> {
        let slot = self
            .slot(&new.session_id)
            .await
            .ok_or_else(|| StorageError::UnknownSession {
                session_id: new.session_id.clone(),
            })?;

        let mut state = slot.lock().await;
        let message = Message {
            id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
            session_id: new.session_id,
            role: new.role,
            content: new.content,
            grade: new.grade,
            subject: new.subject,
            media: new.media,
            created_at: jiff::Timestamp::now(),
        };
        state.messages.push(message.clone());
        state.session.updated_at = message.created_at;

        Ok(message)
    }

    /// Chronological history for a session. An unknown session yields an
    /// empty sequence; callers that need to distinguish absence call
    /// [`ConversationStore::get_session`] first.
    pub async fn list_messages(&self, session_id: &str) -> Vec<Message> {
        match self.slot(session_id).await {
            Some(slot) => slot.lock().await.messages.clone(),
            None => Vec::new(),
        }
    }

    /// Bump the question counter by one. Read-modify-write under the
    /// session lock, so concurrent increments never lose updates.
    pub async fn increment_question_count(
        &self,
        session_id: &str,
    ) -> Result<(), StorageError> {
        let slot = self
            .slot(session_id)
            .await
            .ok_or_else(|| StorageError::UnknownSession {
                session_id: session_id.to_string(),
            })?;
        let mut state = slot.lock().await;
        state.session.questions_asked += 1;
        state.session.updated_at = jiff::Timestamp::now();
        Ok(())
    }

    /// Add estimated study minutes to the session's running total.
    pub async fn add_study_minutes(
        &self,
        session_id: &str,
        minutes: u32,
    ) -> Result<(), StorageError> {
        let slot = self
            .slot(session_id)
            .await
            .ok_or_else(|| StorageError::UnknownSession {
                session_id: session_id.to_string(),
            })?;
        let mut state = slot.lock().await;
        state.session.study_time_minutes += minutes;
        state.session.updated_at = jiff::Timestamp::now();
        Ok(())
    }

    /// Dump every session and message, for snapshotting. Messages keep
    /// their per-session chronological order.
    pub async fn export(&self) -> (Vec<Session>, Vec<Message>) {
        let map = self.sessions.read().await;
        let mut sessions = Vec::with_capacity(map.len());
        let mut messages = Vec::new();
        for slot in map.values() {
            let state = slot.lock().await;
            sessions.push(state.session.clone());
            messages.extend(state.messages.iter().cloned());
        }
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        messages.sort_by_key(|m| m.id);
        (sessions, messages)
    }

    /// Rebuild a store from snapshot contents. The message-id counter
    /// resumes past the highest restored id.
    pub fn import(sessions: Vec<Session>, mut messages: Vec<Message>) -> Self {
        messages.sort_by_key(|m| m.id);
        let next_id = messages.last().map(|m| m.id + 1).unwrap_or(1);

        let mut by_session: HashMap<String, Vec<Message>> = HashMap::new();
        for message in messages {
            by_session
                .entry(message.session_id.clone())
                .or_default()
                .push(message);
        }

        let mut map = HashMap::new();
        for session in sessions {
            let messages = by_session.remove(&session.session_id).unwrap_or_default();
            map.insert(
                session.session_id.clone(),
                Arc::new(Mutex::new(SessionState { session, messages })),
            );
        }

        Self {
            sessions: RwLock::new(map),
            next_message_id: AtomicI64::new(next_id),
        }
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
