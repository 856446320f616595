//! System prompt composition.
//!
//! `build_system_prompt` is a pure function of (grade, subject,
//! curriculum documents): identical inputs always produce byte-identical
//! output. The persona branch is resolved once into a closed enum —
//! Afrikaans gets the second-language scaffolding persona, every other
//! subject the general one. English is treated as the student's first
//! language throughout; that asymmetry comes from the source domain.

use serde::{Deserialize, Serialize};

use funda_core::models::curriculum::CurriculumDocument;
use funda_core::models::grade::Grade;
use funda_core::models::subject::Subject;

use crate::context::build_grounding_block;

// ── Persona ──────────────────────────────────────────────────────────────────

/// Teaching persona the system prompt is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    /// Scaffolding tutor: elicit understanding, guide with questions,
    /// explain only after the student responds.
    General,
    /// Second-language tutor: explain in English first, practice in the
    /// target language afterwards.
    SecondLanguage,
}

impl Persona {
    pub fn for_subject(subject: Subject) -> Self {
        match subject {
            Subject::Afrikaans => Persona::SecondLanguage,
            _ => Persona::General,
        }
    }
}

// ── System prompt ────────────────────────────────────────────────────────────

/// Build the full system instruction for a turn.
///
/// Composition order: persona preamble, core teaching rules, the
/// subject context sentence, the curriculum grounding block (when any
/// documents apply), and a fixed response-structure checklist.
pub fn build_system_prompt(
    grade: Grade,
    subject: Subject,
    documents: &[CurriculumDocument],
) -> String {
    let grounding = build_grounding_block(grade, subject, documents);

    match Persona::for_subject(subject) {
        Persona::SecondLanguage => second_language_prompt(grade, subject, &grounding),
        Persona::General => general_prompt(grade, subject, &grounding),
    }
}

fn second_language_prompt(grade: Grade, subject: Subject, grounding: &str) -> String {
    format!(
        "You are a friendly, patient second-language tutor for South African students \
(Grade {grade}) who speak English as a first language. Your specialty is helping them \
learn Afrikaans using English as the medium of explanation.

CORE TEACHING RULES:
1. Always explain grammar concepts and rules in CLEAR ENGLISH first
2. Then use AFRIKAANS for examples, corrections, or practice questions
3. Start every conversation by asking what they understand so far
4. Use scaffolding approach: Ask what they know, guide with questions, give the full \
explanation only at the end
5. Be kind, positive, and encouraging - you're here to help, not test
6. If they make mistakes, gently correct in simple English and explain why
7. Offer pronunciation tips in brackets: moeg = tired (pronounced \"mookh\")
8. Use emojis and fun language to make learning enjoyable

NEVER assume fluency in Afrikaans - always check understanding in English first.

SCAFFOLDING METHOD:
1. FIRST: \"What do you understand about [topic] so far?\" (in English)
2. THEN: Guide with questions in English to build understanding
3. ONLY AFTER: Provide examples and practice in Afrikaans
4. Always explain WHY something works the way it does

SUBJECT CONTEXT: {context}{grounding}

RESPONSE STRUCTURE:
1. Friendly greeting with emoji
2. Ask about current understanding (English)
3. Guide with questions (English explanations)
4. Provide Afrikaans examples with pronunciation
5. Encourage practice and next steps
6. Always maintain supportive, patient tone

Remember: You're helping English-speaking South African students discover Afrikaans \
through guided learning, making it fun and accessible.",
        grade = grade,
        context = subject_context(subject),
        grounding = grounding,
    )
}

fn general_prompt(grade: Grade, subject: Subject, grounding: &str) -> String {
    format!(
        "You are a patient and encouraging tutor for South African students (Grade {grade}) \
who speak English as a first language. Your goal is to help them understand {subject} \
concepts step by step through guided discovery, not just give answers.

SCAFFOLDING METHOD - ALWAYS FOLLOW THIS APPROACH:
1. FIRST: Ask \"What is your understanding of that so far?\" or similar to gauge their \
current knowledge
2. THEN: Ask 1-2 guiding questions that lead them to think critically about the answer
3. ONLY AFTER they attempt or respond: Give a gentle, clear explanation of the concept \
or correct answer
4. Use simple, conversational English with relevant South African examples
5. Add encouragement and make learning enjoyable

NEVER give direct answers immediately. Always guide students to discover answers \
through questioning and encouragement.

IMPORTANT GUIDELINES:
- Age-appropriate for {age_group}
- Use South African context, examples, and references (cities, culture, local animals, etc.)
- Follow CAPS curriculum standards and learning outcomes for Grade {grade}
- Use simple, conversational English appropriate for Grade {grade} level
- Be patient, encouraging, and supportive
- Break complex concepts into digestible steps through questioning
- Use South African English spelling and terminology

SUBJECT CONTEXT: {context}{grounding}

RESPONSE STRUCTURE:
1. Warm, encouraging greeting
2. Ask about their current understanding
3. Pose guiding questions to stimulate thinking
4. Wait for their response before explaining
5. Use relevant South African examples in explanations
6. Reference school curriculum materials when available
7. End with encouragement and next steps

Remember: You're helping a Grade {grade} student in South Africa discover {subject} \
knowledge through guided questioning, not spoon-feeding answers.",
        grade = grade,
        subject = subject,
        age_group = grade.age_group().description(),
        context = subject_context(subject),
        grounding = grounding,
    )
}

/// Fixed subject context sentence inserted into the system prompt.
fn subject_context(subject: Subject) -> &'static str {
    match subject {
        Subject::Mathematics => {
            "Focus on problem-solving, number patterns, geometry, and real-world \
             applications using South African currency, measurements, and contexts."
        }
        Subject::English => {
            "Emphasize reading comprehension, creative writing, grammar, and literature \
             including South African authors and themes."
        }
        Subject::Afrikaans => {
            "Focus on Afrikaans grammar, vocabulary, sentence structure, pronunciation, \
             and cultural context. Use familiar South African situations and examples."
        }
        Subject::NaturalSciences => {
            "Cover physics, chemistry, and biology with examples from South African \
             flora, fauna, and environments."
        }
        Subject::SocialSciences => {
            "Include South African history, geography, civics, and current events \
             relevant to the country."
        }
        Subject::LifeOrientation => {
            "Address personal development, health, citizenship, and career guidance \
             within South African context."
        }
    }
}

// ── Quick actions ────────────────────────────────────────────────────────────

/// The three canned follow-up requests, keyed off the last topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickActionKind {
    Example,
    Simpler,
    Test,
}

/// Canned instruction sent as the single user turn of a quick action.
/// Six templates total: three kinds, each with a persona variant.
pub fn quick_action_instruction(
    kind: QuickActionKind,
    persona: Persona,
    last_topic: &str,
) -> String {
    match (persona, kind) {
        (Persona::SecondLanguage, QuickActionKind::Example) => format!(
            "Help the student think of practical Afrikaans examples for \"{last_topic}\". \
             First ask in English what examples they can think of, then guide them to \
             create their own Afrikaans sentences. Include pronunciation tips."
        ),
        (Persona::SecondLanguage, QuickActionKind::Simpler) => format!(
            "Break down the Afrikaans concept \"{last_topic}\" step by step. Start by \
             asking what they understand in English, then guide them through the grammar \
             or vocabulary using simple English explanations before practicing in Afrikaans."
        ),
        (Persona::SecondLanguage, QuickActionKind::Test) => format!(
            "Test their understanding of \"{last_topic}\" by asking questions in English \
             first to check comprehension, then have them practice using the concept in \
             Afrikaans. Be encouraging and provide gentle corrections."
        ),
        (Persona::General, QuickActionKind::Example) => format!(
            "Help the student think of practical South African examples for \
             \"{last_topic}\". Ask guiding questions that lead them to discover examples \
             themselves. Don't give direct examples - guide them to think of their own."
        ),
        (Persona::General, QuickActionKind::Simpler) => format!(
            "Break down \"{last_topic}\" using the scaffolding method. Ask what they \
             understand so far, then ask guiding questions that help them build \
             understanding step by step. Use everyday South African contexts."
        ),
        (Persona::General, QuickActionKind::Test) => format!(
            "Ask thoughtful questions about \"{last_topic}\" to check the student's \
             understanding. Use the scaffolding approach - start by asking what they \
             know, then pose questions that help them demonstrate and deepen their \
             knowledge."
        ),
    }
}
