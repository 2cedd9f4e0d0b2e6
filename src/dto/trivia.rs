use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{format_system_time, phase::VisiblePhase},
    state::{
        players::{Player, Standing},
        state_machine::{PlayerOutcome, TriviaEngine},
    },
};

/// Full trivia snapshot broadcast as `game_state_update`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameStateSnapshot {
    pub phase: VisiblePhase,
    pub active: bool,
    pub current_question_index: usize,
    pub total_questions: usize,
    pub question_display_time_remaining: u32,
    pub answering_time_remaining: u32,
    /// Present while a question is being played.
    pub current_question: Option<QuestionSnapshot>,
    /// Indices of options removed from the current question.
    pub eliminated_answers: Vec<usize>,
    pub players: Vec<PlayerSnapshot>,
    pub player_count: usize,
    pub answered_count: usize,
    pub submission_count: u32,
}

impl From<&TriviaEngine> for GameStateSnapshot {
    fn from(engine: &TriviaEngine) -> Self {
        let session = engine.session();
        let players = engine.players();
        Self {
            phase: session.phase.into(),
            active: session.active,
            current_question_index: session.current_question_index,
            total_questions: engine.total_questions(),
            question_display_time_remaining: session.question_display_time_remaining,
            answering_time_remaining: session.answering_time_remaining,
            current_question: engine.current_question().map(|question| QuestionSnapshot {
                prompt: question.prompt.clone(),
                options: question.options.clone(),
            }),
            eliminated_answers: session.eliminated_option_indices.iter().copied().collect(),
            players: players.iter().map(PlayerSnapshot::from).collect(),
            player_count: players.len(),
            answered_count: players.answered_count(),
            submission_count: session.submission_count,
        }
    }
}

/// Question as shown to clients; options keep their stored order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionSnapshot {
    pub prompt: String,
    pub options: Vec<String>,
}

/// Player entry of the snapshot.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub session_id: String,
    pub name: String,
    pub score: u32,
    pub current_answer: Option<String>,
    pub question_score: u32,
    /// RFC 3339 submission time.
    pub answered_at: Option<String>,
    /// RFC 3339 join time.
    pub joined_at: String,
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        Self {
            session_id: player.session_id.clone(),
            name: player.name.clone(),
            score: player.score,
            current_answer: player.current_answer.clone(),
            question_score: player.question_score,
            answered_at: player.answered_at.map(format_system_time),
            joined_at: format_system_time(player.joined_at),
        }
    }
}

/// `eliminate_wrong_answer` payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EliminateWrongAnswer {
    pub answer_index: usize,
}

/// `question_results` payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResults {
    pub correct_answer: String,
    pub player_results: Vec<PlayerResult>,
}

/// Per-player line of `question_results`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResult {
    pub session_id: String,
    pub name: String,
    pub answer: Option<String>,
    pub is_correct: bool,
    pub score: u32,
    pub question_score: u32,
    pub answered_at: Option<String>,
}

impl From<PlayerOutcome> for PlayerResult {
    fn from(outcome: PlayerOutcome) -> Self {
        Self {
            session_id: outcome.session_id,
            name: outcome.name,
            answer: outcome.answer,
            is_correct: outcome.is_correct,
            score: outcome.score,
            question_score: outcome.question_score,
            answered_at: outcome.answered_at.map(format_system_time),
        }
    }
}

/// Ranked line of the leaderboard and final results.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub score: u32,
    pub session_id: String,
}

impl From<Standing> for LeaderboardEntry {
    fn from(standing: Standing) -> Self {
        Self {
            rank: standing.rank,
            name: standing.name,
            score: standing.score,
            session_id: standing.session_id,
        }
    }
}

/// `show_leaderboard` payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShowLeaderboard {
    /// Number of questions resolved so far.
    pub current_question: usize,
    pub total_questions: usize,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// `game_finished` payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameFinished {
    pub final_results: Vec<LeaderboardEntry>,
    pub total_questions: usize,
}
