//! Curriculum document text extraction via the Converse API.
//!
//! Uploaded curriculum files arrive as PDF, DOC, DOCX, or plain text.
//! Plain text needs no model call; the other formats are sent through
//! the Converse `DocumentBlock`, which parses them natively, with a
//! system prompt asking for pure text. When extraction is impossible
//! for a MIME type, registration proceeds with a placeholder string
//! instead of failing.

use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, DocumentBlock, DocumentFormat, DocumentSource, Message,
    SystemContentBlock,
};
use tracing::info;

use crate::error::BedrockError;

const EXTRACTION_SYSTEM_PROMPT: &str = "\
Extract the complete text content from this curriculum document. \
Return only the plain text, preserving paragraph structure. \
Do not add commentary, headers, or formatting.";

/// Map an upload's MIME type to a Converse `DocumentFormat`.
///
/// Returns `None` for MIME types that don't support text extraction;
/// the caller registers a placeholder instead.
pub fn document_format_for_mime(mime: &str) -> Option<DocumentFormat> {
    match mime {
        "application/pdf" => Some(DocumentFormat::Pdf),
        "application/msword" => Some(DocumentFormat::Doc),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
            Some(DocumentFormat::Docx)
        }
        "text/plain" => Some(DocumentFormat::Txt),
        _ => None,
    }
}

/// Placeholder content recorded when a document's text could not be
/// extracted. The document still grounds prompts by name.
pub fn extraction_placeholder(original_name: &str, mime: &str) -> String {
    format!("[Content extracted from {original_name} - text extraction unavailable for {mime}]")
}

/// Extract plain text from a curriculum document via Bedrock.
///
/// The caller chooses the model; extraction quality follows it.
pub async fn extract_document_text(
    config: &aws_config::SdkConfig,
    model_id: &str,
    bytes: &[u8],
    original_name: &str,
    format: DocumentFormat,
) -> Result<String, BedrockError> {
    let client = aws_sdk_bedrockruntime::Client::new(config);

    let doc_block = DocumentBlock::builder()
        .format(format)
        .name(sanitize_document_name(original_name))
        .source(DocumentSource::Bytes(aws_smithy_types::Blob::new(bytes)))
        .build()
        .map_err(|e| BedrockError::Invocation(e.to_string()))?;

    let message = Message::builder()
        .role(ConversationRole::User)
        .content(ContentBlock::Document(doc_block))
        .content(ContentBlock::Text(
            "Extract the full text from this document.".to_string(),
        ))
        .build()
        .map_err(|e| BedrockError::Invocation(e.to_string()))?;

    info!(model_id, original_name, "extracting text from curriculum document");

    let response = client
        .converse()
        .model_id(model_id)
        .system(SystemContentBlock::Text(
            EXTRACTION_SYSTEM_PROMPT.to_string(),
        ))
        .messages(message)
        .send()
        .await
        .map_err(|e| BedrockError::Invocation(e.into_service_error().to_string()))?;

    let output_message = response
        .output()
        .and_then(|o| o.as_message().ok())
        .ok_or_else(|| BedrockError::ResponseParse("no message in response".to_string()))?;

    let text = crate::chat::collect_text(output_message);

    info!(
        model_id,
        original_name,
        text_len = text.len(),
        "curriculum text extraction complete"
    );

    Ok(text)
}

/// Sanitize a filename for use as a Converse `DocumentBlock` name.
///
/// The name field only allows alphanumeric characters, single
/// whitespace, hyphens, parentheses, and square brackets.
fn sanitize_document_name(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '(' || c == ')' || c == '[' || c == ']' {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut result = String::with_capacity(sanitized.len());
    let mut prev_space = false;
    for c in sanitized.chars() {
        if c == ' ' {
            if !prev_space {
                result.push(c);
                prev_space = true;
            }
        } else {
            result.push(c);
            prev_space = false;
        }
    }

    result.trim().to_string()
}
