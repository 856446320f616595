use funda_bedrock::prompt::{
    build_system_prompt, quick_action_instruction, Persona, QuickActionKind,
};
use funda_core::models::curriculum::CurriculumDocument;
use funda_core::models::grade::Grade;
use funda_core::models::subject::Subject;

fn grade(n: u8) -> Grade {
    Grade::new(n).unwrap()
}

fn document(name: &str, content: &str) -> CurriculumDocument {
    CurriculumDocument {
        id: 1,
        file_name: "stored".to_string(),
        original_name: name.to_string(),
        file_type: "application/pdf".to_string(),
        file_size: 100,
        grade: grade(5),
        subject: Subject::Mathematics,
        description: None,
        content: content.to_string(),
        is_active: true,
        uploaded_at: jiff::Timestamp::UNIX_EPOCH,
    }
}

#[test]
fn deterministic_for_identical_inputs() {
    let docs = vec![document("term-plan.pdf", "fractions and decimals")];
    let a = build_system_prompt(grade(5), Subject::Mathematics, &docs);
    let b = build_system_prompt(grade(5), Subject::Mathematics, &docs);
    assert_eq!(a, b);
}

#[test]
fn afrikaans_gets_the_second_language_persona() {
    assert_eq!(
        Persona::for_subject(Subject::Afrikaans),
        Persona::SecondLanguage
    );
    // English stays general: only Afrikaans triggers the bilingual mode.
    assert_eq!(Persona::for_subject(Subject::English), Persona::General);
    assert_eq!(Persona::for_subject(Subject::Mathematics), Persona::General);
}

#[test]
fn afrikaans_prompt_carries_second_language_markers() {
    let prompt = build_system_prompt(grade(8), Subject::Afrikaans, &[]);
    assert!(prompt.contains("explain grammar concepts and rules in CLEAR ENGLISH first"));
    assert!(prompt.contains("NEVER assume fluency in Afrikaans"));
    assert!(prompt.contains("pronounced"));
}

#[test]
fn other_subjects_never_carry_second_language_markers() {
    for subject in [
        Subject::Mathematics,
        Subject::English,
        Subject::NaturalSciences,
        Subject::SocialSciences,
        Subject::LifeOrientation,
    ] {
        let prompt = build_system_prompt(grade(8), subject, &[]);
        assert!(
            !prompt.contains("CLEAR ENGLISH first"),
            "unexpected second-language marker for {subject}"
        );
        assert!(prompt.contains("NEVER give direct answers immediately"));
    }
}

#[test]
fn grade_shapes_tone_text_only() {
    let young = build_system_prompt(grade(2), Subject::English, &[]);
    let senior = build_system_prompt(grade(11), Subject::English, &[]);
    assert!(young.contains("young learners (ages 6-9)"));
    assert!(senior.contains("high school learners (ages 15-18)"));
}

#[test]
fn grounding_block_appears_only_with_documents() {
    let without = build_system_prompt(grade(5), Subject::Mathematics, &[]);
    assert!(!without.contains("SCHOOL-SPECIFIC CURRICULUM MATERIALS"));

    let docs = vec![document("term-plan.pdf", "long division, grade 5")];
    let with = build_system_prompt(grade(5), Subject::Mathematics, &docs);
    assert!(with.contains("SCHOOL-SPECIFIC CURRICULUM MATERIALS"));
    assert!(with.contains("term-plan.pdf"));
    assert!(with.contains("long division, grade 5"));
    assert!(with.contains("prioritize it over general CAPS guidelines"));
}

#[test]
fn quick_action_templates_cover_both_personas() {
    let general =
        quick_action_instruction(QuickActionKind::Example, Persona::General, "fractions");
    assert!(general.contains("fractions"));
    assert!(general.contains("South African"));

    let second = quick_action_instruction(
        QuickActionKind::Simpler,
        Persona::SecondLanguage,
        "die verlede tyd",
    );
    assert!(second.contains("die verlede tyd"));
    assert!(second.contains("English"));
    assert!(second.contains("Afrikaans"));
}
