//! Completion invocation over the Bedrock Converse API.
//!
//! The engine talks to the model through the narrow [`Completion`]
//! trait: system prompt and bounded history in, assistant text out.
//! [`BedrockTutor`] is the production implementation; tests substitute
//! a fake. Failures surface as a single [`BedrockError`] and are never
//! retried here — retry policy belongs to the caller.

use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, ImageBlock, ImageFormat, ImageSource,
    InferenceConfiguration, Message as ConverseMessage, S3Location, SystemContentBlock,
};
use tracing::info;

use funda_core::models::curriculum::CurriculumDocument;
use funda_core::models::grade::Grade;
use funda_core::models::message::Role;
use funda_core::models::subject::Subject;

use crate::error::BedrockError;
use crate::prompt::{self, Persona, QuickActionKind};

// ── Request types ────────────────────────────────────────────────────────────

/// A single history entry in a completion request.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Image format accepted by the Converse image block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageKind {
    /// Infer the format from a URL or file name extension. Defaults to
    /// JPEG, the most common upload format.
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_ascii_lowercase();
        if lower.ends_with(".png") {
            ImageKind::Png
        } else if lower.ends_with(".gif") {
            ImageKind::Gif
        } else if lower.ends_with(".webp") {
            ImageKind::Webp
        } else {
            ImageKind::Jpeg
        }
    }

    fn to_format(self) -> ImageFormat {
        match self {
            ImageKind::Png => ImageFormat::Png,
            ImageKind::Jpeg => ImageFormat::Jpeg,
            ImageKind::Gif => ImageFormat::Gif,
            ImageKind::Webp => ImageFormat::Webp,
        }
    }
}

/// An image the user turn carries, already resolved to something the
/// model can fetch. Resolving a local upload path to an `s3://` URI or
/// to raw bytes is the transport's responsibility, not this core's.
#[derive(Debug, Clone)]
pub enum ImageRef {
    S3 { uri: String, kind: ImageKind },
    Bytes { bytes: Vec<u8>, kind: ImageKind },
}

/// Everything a completion call needs: prompt in, text out.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub history: Vec<ChatMessage>,
    pub user_turn: String,
    pub image: Option<ImageRef>,
    pub max_tokens: i32,
    pub temperature: f32,
}

/// The external completion capability.
pub trait Completion: Send + Sync {
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<String, BedrockError>> + Send;
}

// ── Entry points ─────────────────────────────────────────────────────────────

/// Answer a student question: full system prompt with curriculum
/// grounding, bounded history, and the question as the final user turn
/// (text+image when an image reference is present).
#[allow(clippy::too_many_arguments)]
pub async fn answer_question<C: Completion>(
    completion: &C,
    question: &str,
    grade: Grade,
    subject: Subject,
    documents: &[CurriculumDocument],
    history: Vec<ChatMessage>,
    image: Option<ImageRef>,
    max_tokens: i32,
    temperature: f32,
) -> Result<String, BedrockError> {
    let system_prompt = prompt::build_system_prompt(grade, subject, documents);
    completion
        .complete(CompletionRequest {
            system_prompt,
            history,
            user_turn: question.to_string(),
            image,
            max_tokens,
            temperature,
        })
        .await
}

/// Run one of the canned quick actions: same system prompt, no
/// history, the fixed instruction template as the single user turn.
#[allow(clippy::too_many_arguments)]
pub async fn quick_action<C: Completion>(
    completion: &C,
    kind: QuickActionKind,
    last_topic: &str,
    grade: Grade,
    subject: Subject,
    documents: &[CurriculumDocument],
    max_tokens: i32,
    temperature: f32,
) -> Result<String, BedrockError> {
    let system_prompt = prompt::build_system_prompt(grade, subject, documents);
    let instruction =
        prompt::quick_action_instruction(kind, Persona::for_subject(subject), last_topic);
    completion
        .complete(CompletionRequest {
            system_prompt,
            history: Vec::new(),
            user_turn: instruction,
            image: None,
            max_tokens,
            temperature,
        })
        .await
}

// ── Bedrock implementation ───────────────────────────────────────────────────

/// Converse-backed completion client.
pub struct BedrockTutor {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockTutor {
    pub fn new(config: &aws_config::SdkConfig, model_id: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_bedrockruntime::Client::new(config),
            model_id: model_id.into(),
        }
    }
}

impl Completion for BedrockTutor {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BedrockError> {
        let messages = assemble_messages(&request)?;

        info!(
            model_id = %self.model_id,
            history_len = request.history.len(),
            has_image = request.image.is_some(),
            "invoking completion"
        );

        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(request.system_prompt))
            .set_messages(Some(messages))
            .inference_config(
                InferenceConfiguration::builder()
                    .max_tokens(request.max_tokens)
                    .temperature(request.temperature)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| BedrockError::Invocation(e.into_service_error().to_string()))?;

        let output_message = response
            .output()
            .and_then(|o| o.as_message().ok())
            .ok_or_else(|| BedrockError::ResponseParse("no message in response".to_string()))?;

        let response_text = collect_text(output_message);

        if response_text.is_empty() {
            return Err(BedrockError::ResponseParse(
                "empty completion text".to_string(),
            ));
        }

        Ok(response_text)
    }
}

/// Build the Converse message list: windowed history followed by the
/// user turn (plain text, or a combined text+image block when the turn
/// carries an image reference).
///
/// Converse rejects conversations that do not strictly alternate
/// user/assistant roles, but the stored history can hold consecutive
/// same-role entries (an unanswered user turn after a completion
/// failure, or back-to-back assistant messages from quick actions).
/// Adjacent same-role entries are merged into one message with
/// multiple content blocks.
fn assemble_messages(
    request: &CompletionRequest,
) -> Result<Vec<ConverseMessage>, BedrockError> {
    let mut turns: Vec<(ConversationRole, Vec<ContentBlock>)> =
        Vec::with_capacity(request.history.len() + 1);

    for msg in &request.history {
        let role = match msg.role {
            Role::User => ConversationRole::User,
            Role::Assistant => ConversationRole::Assistant,
        };
        push_block(&mut turns, role, ContentBlock::Text(msg.content.clone()));
    }

    push_block(
        &mut turns,
        ConversationRole::User,
        ContentBlock::Text(request.user_turn.clone()),
    );
    if let Some(image) = &request.image {
        push_block(
            &mut turns,
            ConversationRole::User,
            ContentBlock::Image(build_image_block(image)?),
        );
    }

    let mut messages = Vec::with_capacity(turns.len());
    for (role, blocks) in turns {
        messages.push(
            ConverseMessage::builder()
                .role(role)
                .set_content(Some(blocks))
                .build()
                .map_err(|e| BedrockError::Invocation(e.to_string()))?,
        );
    }

    Ok(messages)
}

fn push_block(
    turns: &mut Vec<(ConversationRole, Vec<ContentBlock>)>,
    role: ConversationRole,
    block: ContentBlock,
) {
    let mergeable = matches!(turns.last(), Some((last_role, _)) if *last_role == role);
    if mergeable {
        if let Some((_, blocks)) = turns.last_mut() {
            blocks.push(block);
        }
    } else {
        turns.push((role, vec![block]));
    }
}

/// Concatenate the text blocks of a Converse output message.
pub(crate) fn collect_text(message: &ConverseMessage) -> String {
    message
        .content()
        .iter()
        .filter_map(|block| {
            if let ContentBlock::Text(text) = block {
                Some(text.as_str())
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

fn build_image_block(image: &ImageRef) -> Result<ImageBlock, BedrockError> {
    let (source, kind) = match image {
        ImageRef::S3 { uri, kind } => {
            let location = S3Location::builder()
                .uri(uri)
                .build()
                .map_err(|e| BedrockError::UnsupportedMedia(e.to_string()))?;
            (ImageSource::S3Location(location), *kind)
        }
        ImageRef::Bytes { bytes, kind } => (
            ImageSource::Bytes(aws_smithy_types::Blob::new(bytes.clone())),
            *kind,
        ),
    };

    ImageBlock::builder()
        .format(kind.to_format())
        .source(source)
        .build()
        .map_err(|e| BedrockError::UnsupportedMedia(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(role: Role, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }

    fn request(history: Vec<ChatMessage>, user_turn: &str) -> CompletionRequest {
        CompletionRequest {
            system_prompt: String::new(),
            history,
            user_turn: user_turn.to_string(),
            image: None,
            max_tokens: 800,
            temperature: 0.7,
        }
    }

    #[test]
    fn assembled_conversation_alternates_starting_with_user() {
        let history = vec![
            chat(Role::User, "q1"),
            chat(Role::Assistant, "a1"),
            chat(Role::User, "q2"),
            chat(Role::Assistant, "a2"),
        ];
        let messages = assemble_messages(&request(history, "q3")).unwrap();

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].role(), &ConversationRole::User);
        assert!(
            messages
                .windows(2)
                .all(|pair| pair[0].role() != pair[1].role())
        );
        assert!(matches!(
            &messages[4].content()[0],
            ContentBlock::Text(text) if text == "q3"
        ));
    }

    #[test]
    fn unanswered_user_turn_merges_with_the_new_one() {
        // A completion failure leaves a user message with no reply.
        let history = vec![chat(Role::User, "q1")];
        let messages = assemble_messages(&request(history, "q2")).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role(), &ConversationRole::User);
        assert_eq!(messages[0].content().len(), 2);
    }

    #[test]
    fn consecutive_assistant_entries_merge() {
        // Quick actions persist assistant messages without a user turn.
        let history = vec![
            chat(Role::User, "q1"),
            chat(Role::Assistant, "a1"),
            chat(Role::Assistant, "here's a practice question"),
        ];
        let messages = assemble_messages(&request(history, "q2")).unwrap();

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role(), &ConversationRole::Assistant);
        assert_eq!(messages[1].content().len(), 2);
        assert_eq!(messages[2].role(), &ConversationRole::User);
    }

    #[test]
    fn image_rides_on_the_final_user_message() {
        let mut req = request(Vec::new(), "what shape is this?");
        req.image = Some(ImageRef::S3 {
            uri: "s3://uploads/shape.png".to_string(),
            kind: ImageKind::Png,
        });
        let messages = assemble_messages(&req).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content().len(), 2);
        assert!(matches!(&messages[0].content()[1], ContentBlock::Image(_)));
    }
}
