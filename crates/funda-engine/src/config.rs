/// Named tuning constants for the orchestrator.
///
/// Defaults mirror the production values; tests override individual
/// fields instead of reaching for literals.
#[derive(Debug, Clone)]
pub struct TutorConfig {
    /// How many trailing messages of a session's history accompany a
    /// completion request.
    pub context_window: usize,
    /// Study minutes credited per completed turn. A flat engagement
    /// estimate, not measured elapsed time.
    pub study_minutes_per_turn: u32,
    /// Token budget for answering a student question.
    pub answer_max_tokens: i32,
    /// Token budget for a quick action.
    pub quick_max_tokens: i32,
    /// Sampling temperature for all completion calls.
    pub temperature: f32,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            context_window: 10,
            study_minutes_per_turn: 2,
            answer_max_tokens: 800,
            quick_max_tokens: 400,
            temperature: 0.7,
        }
    }
}
