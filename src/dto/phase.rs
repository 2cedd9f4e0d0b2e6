use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::TriviaPhase;

/// Trivia phase as exposed to clients (WebSocket, SSE and REST).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum VisiblePhase {
    /// Lobby open, no game running.
    Waiting,
    /// Question shown, answers not accepted yet.
    QuestionDisplay,
    /// Answers accepted.
    Answering,
    /// Correct answer revealed.
    Results,
    /// Intermediate standings.
    Leaderboard,
    /// Final standings.
    Finished,
}

impl From<TriviaPhase> for VisiblePhase {
    fn from(value: TriviaPhase) -> Self {
        match value {
            TriviaPhase::Waiting => VisiblePhase::Waiting,
            TriviaPhase::QuestionDisplay => VisiblePhase::QuestionDisplay,
            TriviaPhase::Answering => VisiblePhase::Answering,
            TriviaPhase::Results => VisiblePhase::Results,
            TriviaPhase::Leaderboard => VisiblePhase::Leaderboard,
            TriviaPhase::Finished => VisiblePhase::Finished,
        }
    }
}
