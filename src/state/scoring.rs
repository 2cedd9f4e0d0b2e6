//! Points awarded for a single answer.

/// Base points for a correct answer when the config does not override it.
pub const DEFAULT_BASE_POINTS: u32 = 60;

/// Time-bonus scoring: a correct answer earns the base points plus one point per
/// second still left on the answering countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    base_points: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_POINTS)
    }
}

impl ScoringPolicy {
    /// Build a policy awarding `base_points` for every correct answer.
    pub fn new(base_points: u32) -> Self {
        Self { base_points }
    }

    /// Points for an answer submitted with `time_remaining_secs` on the clock.
    ///
    /// Wrong and missing answers are both worth zero.
    pub fn score(&self, is_correct: bool, time_remaining_secs: u32) -> u32 {
        if !is_correct {
            return 0;
        }
        self.base_points.saturating_add(time_remaining_secs)
    }
}
