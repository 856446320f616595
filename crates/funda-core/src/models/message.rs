use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::grade::Grade;
use super::subject::Subject;

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    User,
    Assistant,
}

/// Kind of media attached to a user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MediaKind {
    Image,
    Video,
    Diagram,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Diagram => "diagram",
        }
    }
}

/// Reference to an uploaded media file attached to a user turn.
///
/// The URL points at wherever the transport stored the binary; the core
/// never dereferences it except when handing an image to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub url: String,
    pub thumbnail: Option<String>,
}

/// One persisted turn in a conversation.
///
/// `grade` and `subject` are snapshots of the session's values at the
/// moment the message was created; the session's current values may
/// diverge after a mid-conversation change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Message {
    pub id: i64,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub grade: Grade,
    pub subject: Subject,
    pub media: Option<MediaRef>,
    pub created_at: jiff::Timestamp,
}

/// Fields for appending a message; id and timestamp are assigned by
/// the conversation store.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub grade: Grade,
    pub subject: Subject,
    pub media: Option<MediaRef>,
}
