use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::grade::Grade;
use super::subject::Subject;

/// One ongoing tutoring conversation.
///
/// `session_id` is the sole external handle. Grade and subject changes
/// mutate the session in place; past messages keep the values recorded
/// at send time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Session {
    pub session_id: String,
    pub current_grade: Grade,
    pub current_subject: Subject,
    /// Completed question/answer turns. Monotonically non-decreasing.
    pub questions_asked: u32,
    /// Estimated minutes of engagement, incremented by a fixed amount
    /// per turn. An approximation, not measured elapsed time.
    pub study_time_minutes: u32,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

/// Partial update applied to a session's grade and subject.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct SessionPatch {
    pub grade: Option<Grade>,
    pub subject: Option<Subject>,
}
