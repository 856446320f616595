//! JSON snapshot of the whole store.
//!
//! The backing store is volatile; a transport that wants durability can
//! export the snapshot on shutdown and restore it on startup.

use serde::{Deserialize, Serialize};

use funda_core::models::curriculum::CurriculumDocument;
use funda_core::models::message::Message;
use funda_core::models::session::Session;

use crate::conversations::ConversationStore;
use crate::documents::DocumentIndex;
use crate::error::StorageError;

/// Serializable dump of all sessions, messages, and documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub sessions: Vec<Session>,
    pub messages: Vec<Message>,
    pub documents: Vec<CurriculumDocument>,
}

/// Capture the current contents of both stores.
pub async fn take(store: &ConversationStore, index: &DocumentIndex) -> StoreSnapshot {
    let (sessions, messages) = store.export().await;
    let documents = index.export().await;
    StoreSnapshot {
        sessions,
        messages,
        documents,
    }
}

/// Rebuild both stores from a snapshot.
pub fn restore(snapshot: StoreSnapshot) -> (ConversationStore, DocumentIndex) {
    let store = ConversationStore::import(snapshot.sessions, snapshot.messages);
    let index = DocumentIndex::import(snapshot.documents);
    (store, index)
}

impl StoreSnapshot {
    pub fn to_json(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, StorageError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
