//! Curriculum document index.
//!
//! Documents are held in insertion order and scoped to an exact
//! (grade, subject) pair. Deletion is logical: `deactivate` clears the
//! active flag and retrieval filters exclude inactive documents, but
//! the record stays addressable by id.

use tokio::sync::Mutex;
use tracing::info;

use funda_core::models::curriculum::{CurriculumDocument, NewCurriculumDocument};
use funda_core::models::grade::Grade;
use funda_core::models::subject::Subject;

struct IndexState {
    documents: Vec<CurriculumDocument>,
    next_id: i64,
}

/// Index of curriculum reference material by grade and subject.
pub struct DocumentIndex {
    inner: Mutex<IndexState>,
}

impl DocumentIndex {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(IndexState {
                documents: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Register a document, assigning its id and upload timestamp.
    pub async fn insert(&self, new: NewCurriculumDocument) -> CurriculumDocument {
        let mut state = self.inner.lock().await;
        let document = CurriculumDocument {
            id: state.next_id,
            file_name: new.file_name,
            original_name: new.original_name,
            file_type: new.file_type,
            file_size: new.file_size,
            grade: new.grade,
            subject: new.subject,
            description: new.description,
            content: new.content,
            is_active: true,
            uploaded_at: jiff::Timestamp::now(),
        };
        state.next_id += 1;
        state.documents.push(document.clone());

        info!(
            id = document.id,
            original_name = %document.original_name,
            grade = %document.grade,
            subject = %document.subject,
            "registered curriculum document"
        );

        document
    }

    /// Active documents for an exact (grade, subject) pair, in
    /// insertion order.
    pub async fn find_active(&self, grade: Grade, subject: Subject) -> Vec<CurriculumDocument> {
        self.inner
            .lock()
            .await
            .documents
            .iter()
            .filter(|d| d.is_active && d.grade == grade && d.subject == subject)
            .cloned()
            .collect()
    }

    /// All active documents, in insertion order.
    pub async fn find_all_active(&self) -> Vec<CurriculumDocument> {
        self.inner
            .lock()
            .await
            .documents
            .iter()
            .filter(|d| d.is_active)
            .cloned()
            .collect()
    }

    /// Direct lookup by id, regardless of the active flag.
    pub async fn get(&self, id: i64) -> Option<CurriculumDocument> {
        self.inner
            .lock()
            .await
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    /// Flag a document inactive. Returns false when the id is unknown;
    /// deactivating an unknown id is a benign no-op for the caller.
    pub async fn deactivate(&self, id: i64) -> bool {
        let mut state = self.inner.lock().await;
        match state.documents.iter_mut().find(|d| d.id == id) {
            Some(document) => {
                document.is_active = false;
                info!(id, "deactivated curriculum document");
                true
            }
            None => false,
        }
    }

    /// Dump every document, for snapshotting.
    pub async fn export(&self) -> Vec<CurriculumDocument> {
        self.inner.lock().await.documents.clone()
    }

    /// Rebuild an index from snapshot contents. The id counter resumes
    /// past the highest restored id.
    pub fn import(documents: Vec<CurriculumDocument>) -> Self {
        let next_id = documents.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        Self {
            inner: Mutex::new(IndexState { documents, next_id }),
        }
    }
}

impl Default for DocumentIndex {
    fn default() -> Self {
        Self::new()
    }
}
