use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::grade::Grade;
use super::subject::Subject;

/// A piece of school-supplied reference material, scoped to one
/// (grade, subject) pair.
///
/// `content` is the extracted plain text used for prompt grounding; it
/// may be a placeholder when extraction was not possible for the file's
/// MIME type. Documents are soft-deleted by clearing `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CurriculumDocument {
    pub id: i64,
    /// Internal storage name assigned by the upload collaborator.
    pub file_name: String,
    pub original_name: String,
    /// MIME type, e.g. `application/pdf`.
    pub file_type: String,
    pub file_size: u64,
    pub grade: Grade,
    pub subject: Subject,
    pub description: Option<String>,
    pub content: String,
    pub is_active: bool,
    pub uploaded_at: jiff::Timestamp,
}

/// Fields for registering a document; the id and upload timestamp are
/// assigned by the document index.
#[derive(Debug, Clone)]
pub struct NewCurriculumDocument {
    pub file_name: String,
    pub original_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub grade: Grade,
    pub subject: Subject,
    pub description: Option<String>,
    pub content: String,
}
