//! Orchestrator tests against a recording fake completion.

use std::sync::{Arc, Mutex};

use funda_bedrock::chat::{Completion, CompletionRequest, ImageKind, ImageRef};
use funda_bedrock::error::BedrockError;
use funda_bedrock::prompt::QuickActionKind;
use funda_core::models::grade::Grade;
use funda_core::models::message::{MediaKind, MediaRef, Role};
use funda_core::models::subject::Subject;
use funda_engine::config::TutorConfig;
use funda_engine::engine::{RegisterDocument, TurnRequest, TutorEngine};
use funda_engine::error::EngineError;
use funda_store::conversations::ConversationStore;
use funda_store::documents::DocumentIndex;

/// Completion double that records every request and returns a canned
/// reply, or fails when told to.
struct FakeTutor {
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    reply: String,
    fail: bool,
}

impl FakeTutor {
    fn new(reply: &str) -> (Self, Arc<Mutex<Vec<CompletionRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let fake = Self {
            requests: Arc::clone(&requests),
            reply: reply.to_string(),
            fail: false,
        };
        (fake, requests)
    }

    fn failing() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            reply: String::new(),
            fail: true,
        }
    }
}

impl Completion for FakeTutor {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BedrockError> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            Err(BedrockError::Invocation("model unavailable".to_string()))
        } else {
            Ok(self.reply.clone())
        }
    }
}

fn engine(fake: FakeTutor) -> TutorEngine<FakeTutor> {
    TutorEngine::new(
        Arc::new(ConversationStore::new()),
        Arc::new(DocumentIndex::new()),
        fake,
        TutorConfig::default(),
    )
}

fn grade(n: u8) -> Grade {
    Grade::new(n).unwrap()
}

fn turn(session_id: &str, message: &str, g: u8, subject: Subject) -> TurnRequest {
    TurnRequest {
        session_id: session_id.to_string(),
        message: message.to_string(),
        grade: grade(g),
        subject,
        media: None,
    }
}

#[tokio::test]
async fn send_turn_persists_both_messages_and_bumps_counters() {
    let (fake, _requests) = FakeTutor::new("Let's start: what do you know about times tables?");
    let engine = engine(fake);
    let session = engine
        .create_session(grade(5), Subject::Mathematics)
        .await;

    let outcome = engine
        .send_turn(turn(&session.session_id, "what is 7 times 8?", 5, Subject::Mathematics))
        .await
        .unwrap();

    assert_eq!(
        outcome.response,
        "Let's start: what do you know about times tables?"
    );
    assert_eq!(outcome.message.role, Role::Assistant);

    let messages = engine.list_messages(&session.session_id).await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "what is 7 times 8?");
    assert_eq!(messages[1].role, Role::Assistant);

    let session = engine.get_session(&session.session_id).await.unwrap();
    assert_eq!(session.questions_asked, 1);
    assert_eq!(session.study_time_minutes, 2);
}

#[tokio::test]
async fn empty_turn_is_rejected_before_persisting() {
    let (fake, requests) = FakeTutor::new("unused");
    let engine = engine(fake);
    let session = engine.create_session(grade(5), Subject::English).await;

    let err = engine
        .send_turn(turn(&session.session_id, "   ", 5, Subject::English))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidTurn(_)));
    assert!(engine.list_messages(&session.session_id).await.is_empty());
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_session_is_rejected() {
    let (fake, _requests) = FakeTutor::new("unused");
    let engine = engine(fake);

    let err = engine
        .send_turn(turn("no-such-session", "hello", 5, Subject::English))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::UnknownSession(_)));
}

#[tokio::test]
async fn completion_failure_keeps_the_user_turn() {
    let engine = engine(FakeTutor::failing());
    let session = engine.create_session(grade(7), Subject::Mathematics).await;

    let err = engine
        .send_turn(turn(&session.session_id, "what is a prime?", 7, Subject::Mathematics))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::CompletionFailed(_)));

    // The question stays in the record even though it went unanswered,
    // and the progress counters do not move.
    let messages = engine.list_messages(&session.session_id).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);

    let session = engine.get_session(&session.session_id).await.unwrap();
    assert_eq!(session.questions_asked, 0);
    assert_eq!(session.study_time_minutes, 0);
}

#[tokio::test]
async fn history_is_capped_at_the_context_window() {
    let (fake, requests) = FakeTutor::new("answer");
    let engine = engine(fake);
    let session = engine.create_session(grade(6), Subject::Mathematics).await;

    for i in 1..=11 {
        engine
            .send_turn(turn(
                &session.session_id,
                &format!("question {i}"),
                6,
                Subject::Mathematics,
            ))
            .await
            .unwrap();
    }

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 11);

    // Turn 11 has 20 prior messages; only the trailing 10 accompany
    // the request, and the turn itself travels separately as the final
    // user message.
    let last = &requests[10];
    assert_eq!(last.history.len(), 10);
    assert_eq!(last.history[0].role, Role::User);
    assert_eq!(last.history[0].content, "question 6");
    assert_eq!(last.history[9].role, Role::Assistant);
    assert_eq!(last.user_turn, "question 11");

    // Early turns pass through unclipped.
    assert!(requests[0].history.is_empty());
    assert_eq!(requests[1].history.len(), 2);
}

#[tokio::test]
async fn request_conversations_alternate_starting_with_user() {
    let (fake, requests) = FakeTutor::new("answer");
    // An odd window makes the cut land on an assistant reply.
    let engine = TutorEngine::new(
        Arc::new(ConversationStore::new()),
        Arc::new(DocumentIndex::new()),
        fake,
        TutorConfig {
            context_window: 3,
            ..TutorConfig::default()
        },
    );
    let session = engine.create_session(grade(6), Subject::English).await;

    for i in 1..=4 {
        engine
            .send_turn(turn(
                &session.session_id,
                &format!("question {i}"),
                6,
                Subject::English,
            ))
            .await
            .unwrap();
    }

    for request in requests.lock().unwrap().iter() {
        if let Some(first) = request.history.first() {
            assert_eq!(first.role, Role::User);
        }
        if let Some(last) = request.history.last() {
            assert_eq!(last.role, Role::Assistant);
        }
        // The current turn appears only as the explicit user turn.
        assert!(
            request
                .history
                .iter()
                .all(|m| m.content != request.user_turn)
        );
    }
}

#[tokio::test]
async fn image_turn_carries_the_reference_and_annotates_the_question() {
    let (fake, requests) = FakeTutor::new("I see a triangle.");
    let engine = engine(fake);
    let session = engine.create_session(grade(8), Subject::Mathematics).await;

    engine
        .send_turn(TurnRequest {
            session_id: session.session_id.clone(),
            message: "what shape is this?".to_string(),
            grade: grade(8),
            subject: Subject::Mathematics,
            media: Some(MediaRef {
                kind: MediaKind::Image,
                url: "s3://uploads/geometry.png".to_string(),
                thumbnail: None,
            }),
        })
        .await
        .unwrap();

    let requests = requests.lock().unwrap();
    let request = &requests[0];
    match &request.image {
        Some(ImageRef::S3 { uri, kind }) => {
            assert_eq!(uri, "s3://uploads/geometry.png");
            assert_eq!(*kind, ImageKind::Png);
        }
        other => panic!("expected an S3 image reference, got {other:?}"),
    }
    assert_eq!(
        request.user_turn,
        "what shape is this? [User shared an image for analysis]"
    );
}

#[tokio::test]
async fn media_only_turn_gets_placeholder_content_and_analysis_question() {
    let (fake, requests) = FakeTutor::new("Here's what the image shows.");
    let engine = engine(fake);
    let session = engine.create_session(grade(4), Subject::NaturalSciences).await;

    engine
        .send_turn(TurnRequest {
            session_id: session.session_id.clone(),
            message: String::new(),
            grade: grade(4),
            subject: Subject::NaturalSciences,
            media: Some(MediaRef {
                kind: MediaKind::Image,
                url: "s3://uploads/leaf.jpg".to_string(),
                thumbnail: None,
            }),
        })
        .await
        .unwrap();

    let messages = engine.list_messages(&session.session_id).await;
    assert_eq!(messages[0].content, "[image content shared]");

    let requests = requests.lock().unwrap();
    assert!(requests[0].user_turn.starts_with("Please analyze this image"));
    assert!(requests[0].user_turn.contains("Grade 4 natural-sciences"));
}

#[tokio::test]
async fn afrikaans_turns_use_the_second_language_prompt() {
    let (fake, requests) = FakeTutor::new("Goeie dag!");
    let engine = engine(fake);
    let session = engine.create_session(grade(8), Subject::Afrikaans).await;

    engine
        .send_turn(turn(&session.session_id, "how do plurals work?", 8, Subject::Afrikaans))
        .await
        .unwrap();

    let requests = requests.lock().unwrap();
    let prompt = &requests[0].system_prompt;
    assert!(prompt.contains("CLEAR ENGLISH first"));
    assert!(prompt.contains("NEVER assume fluency in Afrikaans"));
    assert!(!prompt.contains("NEVER give direct answers immediately"));
}

#[tokio::test]
async fn quick_action_appends_only_the_assistant_message() {
    let (fake, requests) = FakeTutor::new("Here's a practice question.");
    let engine = engine(fake);
    let session = engine.create_session(grade(9), Subject::SocialSciences).await;

    let response = engine
        .quick_action(
            QuickActionKind::Test,
            &session.session_id,
            "the Great Trek",
            grade(9),
            Subject::SocialSciences,
        )
        .await
        .unwrap();
    assert_eq!(response, "Here's a practice question.");

    let messages = engine.list_messages(&session.session_id).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::Assistant);

    // Quick actions are follow-ups, not questions: counters stay put
    // and no history accompanies the request.
    let session = engine.get_session(&session.session_id).await.unwrap();
    assert_eq!(session.questions_asked, 0);
    assert_eq!(session.study_time_minutes, 0);

    let requests = requests.lock().unwrap();
    assert!(requests[0].history.is_empty());
    assert!(requests[0].user_turn.contains("the Great Trek"));
}

#[tokio::test]
async fn quick_action_requires_an_existing_session() {
    let (fake, _requests) = FakeTutor::new("unused");
    let engine = engine(fake);

    let err = engine
        .quick_action(
            QuickActionKind::Example,
            "no-such-session",
            "fractions",
            grade(5),
            Subject::Mathematics,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::UnknownSession(_)));
}

#[tokio::test]
async fn grounded_turn_includes_matching_curriculum() {
    let (fake, requests) = FakeTutor::new("grounded answer");
    let engine = engine(fake);
    let session = engine.create_session(grade(5), Subject::Mathematics).await;

    engine
        .register_document(RegisterDocument {
            file_name: "frac-2026.pdf".to_string(),
            original_name: "Fractions Workbook.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size_bytes: 2048,
            grade: grade(5),
            subject: Subject::Mathematics,
            description: Some("Term 2 fractions unit".to_string()),
            extracted_text: Some("Fractions represent parts of a whole.".to_string()),
        })
        .await;
    // Different grade, must not leak into the prompt.
    engine
        .register_document(RegisterDocument {
            file_name: "alg-2026.pdf".to_string(),
            original_name: "Algebra Notes.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size_bytes: 1024,
            grade: grade(9),
            subject: Subject::Mathematics,
            description: None,
            extracted_text: Some("Solve for x.".to_string()),
        })
        .await;

    engine
        .send_turn(turn(&session.session_id, "what is half of a half?", 5, Subject::Mathematics))
        .await
        .unwrap();

    let requests = requests.lock().unwrap();
    let prompt = &requests[0].system_prompt;
    assert!(prompt.contains("SCHOOL-SPECIFIC CURRICULUM MATERIALS"));
    assert!(prompt.contains("Fractions Workbook.pdf"));
    assert!(!prompt.contains("Algebra Notes.pdf"));
}

#[tokio::test]
async fn register_document_falls_back_to_a_placeholder() {
    let (fake, _requests) = FakeTutor::new("unused");
    let engine = engine(fake);

    let document = engine
        .register_document(RegisterDocument {
            file_name: "scan.png".to_string(),
            original_name: "Worksheet Scan.png".to_string(),
            mime_type: "image/png".to_string(),
            size_bytes: 4096,
            grade: grade(6),
            subject: Subject::English,
            description: None,
            extracted_text: Some("   ".to_string()),
        })
        .await;

    assert_eq!(
        document.content,
        "[Content extracted from Worksheet Scan.png - text extraction unavailable for image/png]"
    );
    assert!(document.is_active);
}

#[tokio::test]
async fn curriculum_listing_and_deactivation() {
    let (fake, _requests) = FakeTutor::new("unused");
    let engine = engine(fake);

    let document = engine
        .register_document(RegisterDocument {
            file_name: "hist.pdf".to_string(),
            original_name: "History Outline.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size_bytes: 512,
            grade: grade(7),
            subject: Subject::SocialSciences,
            description: None,
            extracted_text: Some("Timeline of events.".to_string()),
        })
        .await;

    let listed = engine
        .list_curriculum(Some((grade(7), Subject::SocialSciences)))
        .await;
    assert_eq!(listed.len(), 1);
    assert_eq!(engine.list_curriculum(None).await.len(), 1);

    assert!(engine.deactivate_document(document.id).await);
    assert!(engine
        .list_curriculum(Some((grade(7), Subject::SocialSciences)))
        .await
        .is_empty());
    // Still addressable directly.
    assert!(engine.get_document(document.id).await.is_some());

    assert!(!engine.deactivate_document(9999).await);
}

#[tokio::test]
async fn patch_session_changes_future_defaults_only() {
    let (fake, _requests) = FakeTutor::new("ok");
    let engine = engine(fake);
    let session = engine.create_session(grade(5), Subject::Mathematics).await;

    engine
        .send_turn(turn(&session.session_id, "first question", 5, Subject::Mathematics))
        .await
        .unwrap();

    let patched = engine
        .patch_session(
            &session.session_id,
            funda_core::models::session::SessionPatch {
                grade: Some(grade(6)),
                subject: Some(Subject::NaturalSciences),
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.current_grade, grade(6));
    assert_eq!(patched.current_subject, Subject::NaturalSciences);

    // Messages keep the grade and subject they were sent under.
    let messages = engine.list_messages(&session.session_id).await;
    assert_eq!(messages[0].grade, grade(5));
    assert_eq!(messages[0].subject, Subject::Mathematics);
}
