//! Server-authoritative trivia session: phases, countdowns and player commands.
//!
//! The engine never touches a timer itself. The runtime calls [`TriviaEngine::tick`]
//! once per countdown second and drains the queued [`TriviaEvent`]s after every
//! call, which keeps the whole flow testable without real time passing.

use std::{collections::BTreeSet, sync::Arc, time::SystemTime};

use rand::{SeedableRng, rngs::StdRng};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::TriviaSettings,
    state::{
        clock::Clock,
        elimination::EliminationScheduler,
        players::{Player, PlayerRegistry, Standing, sanitize_name},
        questions::{Question, QuestionBank},
        scoring::ScoringPolicy,
    },
};

/// Phases of a trivia session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaPhase {
    /// Idle lobby; players join and pick names.
    Waiting,
    /// The question is shown without accepting answers.
    QuestionDisplay,
    /// Players submit answers while options get eliminated.
    Answering,
    /// The correct answer and per-player results are shown.
    Results,
    /// Intermediate standings between questions.
    Leaderboard,
    /// Final standings; the session is no longer active.
    Finished,
}

/// Reasons a player or host command is refused. No state changes when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// `start` while a game is running.
    #[error("game is already active")]
    AlreadyActive,
    /// `start` after a finished game that was not reset.
    #[error("game must be reset before starting again")]
    NotWaiting,
    /// `start` with an empty lobby.
    #[error("no players have joined")]
    NoPlayers,
    /// `start` with no question loaded.
    #[error("question bank is empty")]
    NoQuestions,
    /// Answer submitted outside the answering phase.
    #[error("answers are only accepted while answering")]
    NotAnswering,
    /// Rename requested once the game left the lobby.
    #[error("game already started")]
    GameAlreadyStarted,
    /// Command for an identity that never joined.
    #[error("player is not registered")]
    UnknownPlayer,
    /// Command without a session identity.
    #[error("missing session id")]
    MissingIdentity,
    /// Payload failed validation.
    #[error("invalid request: {0}")]
    InvalidPayload(String),
    /// Answer text that is not one of the current options.
    #[error("answer is not one of the current options")]
    UnknownOption,
    /// Name that is empty once trimmed.
    #[error("name must not be empty")]
    EmptyName,
}

/// Result of one player's answer once the question resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerOutcome {
    /// Identity of the player.
    pub session_id: String,
    /// Display name.
    pub name: String,
    /// Submitted answer, if any.
    pub answer: Option<String>,
    /// Whether the answer was correct.
    pub is_correct: bool,
    /// Cumulative score after folding this question.
    pub score: u32,
    /// Points earned on this question.
    pub question_score: u32,
    /// Submission time.
    pub answered_at: Option<SystemTime>,
}

/// Everything revealed when a question resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOutcome {
    /// Text of the correct option.
    pub correct_answer: String,
    /// One entry per registered player, in join order.
    pub players: Vec<PlayerOutcome>,
}

/// Observable changes queued for the broadcast gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriviaEvent {
    /// Session or registry changed; clients should re-render the full snapshot.
    StateChanged,
    /// A wrong option was removed from the current question.
    OptionEliminated {
        /// Index of the removed option.
        option_index: usize,
    },
    /// The current question resolved.
    QuestionResolved(QuestionOutcome),
    /// Intermediate standings.
    LeaderboardShown {
        /// Questions resolved so far.
        completed: usize,
        /// Questions in the bank.
        total: usize,
        /// Current ranking.
        standings: Vec<Standing>,
    },
    /// The last question resolved.
    GameFinished {
        /// Questions in the bank.
        total: usize,
        /// Final ranking.
        standings: Vec<Standing>,
    },
}

/// Confirmation handed back to a player whose answer was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReceipt {
    /// Stored answer text.
    pub answer: String,
    /// Submission time.
    pub answered_at: SystemTime,
}

/// Process-wide trivia session fields. Only [`TriviaEngine`] mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Whether a game is running.
    pub active: bool,
    /// Current phase.
    pub phase: TriviaPhase,
    /// 0-based index of the current question.
    pub current_question_index: usize,
    /// Seconds left in the answering phase.
    pub answering_time_remaining: u32,
    /// Seconds left in the question display phase.
    pub question_display_time_remaining: u32,
    /// Options removed from the current question.
    pub eliminated_option_indices: BTreeSet<usize>,
    /// Accepted submissions for the current question, resubmissions included.
    pub submission_count: u32,
    /// Seconds left on the results or leaderboard screen.
    pub hold_remaining: u32,
    /// Checkpoints already fired for the current question.
    fired_checkpoints: BTreeSet<u32>,
    /// Whether question scores were already folded into cumulative scores.
    scores_folded: bool,
}

impl SessionState {
    fn new(settings: &TriviaSettings) -> Self {
        Self {
            active: false,
            phase: TriviaPhase::Waiting,
            current_question_index: 0,
            answering_time_remaining: settings.answering_secs,
            question_display_time_remaining: settings.question_display_secs,
            eliminated_option_indices: BTreeSet::new(),
            submission_count: 0,
            hold_remaining: 0,
            fired_checkpoints: BTreeSet::new(),
            scores_folded: false,
        }
    }
}

/// Owns the session, the registry and the question bank, and applies every
/// command and tick to them.
pub struct TriviaEngine {
    settings: TriviaSettings,
    questions: Arc<QuestionBank>,
    session: SessionState,
    players: PlayerRegistry,
    scoring: ScoringPolicy,
    elimination: EliminationScheduler,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    events: Vec<TriviaEvent>,
}

impl TriviaEngine {
    /// Build an engine with an OS-seeded random generator.
    pub fn new(settings: TriviaSettings, questions: Arc<QuestionBank>, clock: Arc<dyn Clock>) -> Self {
        Self::with_rng(settings, questions, clock, StdRng::from_os_rng())
    }

    /// Build an engine with an explicit random generator.
    pub fn with_rng(
        settings: TriviaSettings,
        questions: Arc<QuestionBank>,
        clock: Arc<dyn Clock>,
        rng: StdRng,
    ) -> Self {
        Self {
            session: SessionState::new(&settings),
            players: PlayerRegistry::new(),
            scoring: ScoringPolicy::new(settings.base_points),
            elimination: EliminationScheduler::new(settings.elimination_checkpoints.iter().copied()),
            settings,
            questions,
            clock,
            rng,
            events: Vec::new(),
        }
    }

    /// Current session fields.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Registered players.
    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    /// Number of questions in the bank.
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Question currently played, if the index points inside the bank.
    pub fn current_question(&self) -> Option<&Question> {
        match self.session.phase {
            TriviaPhase::Waiting | TriviaPhase::Finished => None,
            _ => self.questions.get(self.session.current_question_index),
        }
    }

    /// Whether the engine expects ticks.
    pub fn is_running(&self) -> bool {
        self.session.active
    }

    /// Take every event queued since the previous call.
    pub fn drain_events(&mut self) -> Vec<TriviaEvent> {
        std::mem::take(&mut self.events)
    }

    /// Register a player or return the existing record for `session_id`.
    pub fn join(&mut self, session_id: &str, user_agent: Option<String>) -> Result<Player, Rejection> {
        let session_id = require_identity(session_id)?;
        let now = self.clock.now();
        let (player, created) = self.players.join(session_id, user_agent, now);
        let player = player.clone();
        if created {
            info!(session_id, name = %player.name, "player joined");
        } else {
            debug!(session_id, "player rejoined");
        }
        self.events.push(TriviaEvent::StateChanged);
        Ok(player)
    }

    /// Remove a disconnected player. Their score is discarded.
    pub fn leave(&mut self, session_id: &str) -> Option<Player> {
        let removed = self.players.remove(session_id)?;
        info!(session_id, name = %removed.name, "player left");
        self.events.push(TriviaEvent::StateChanged);
        Some(removed)
    }

    /// Store or replace a player's answer and compute its live score.
    pub fn submit_answer(&mut self, session_id: &str, answer: &str) -> Result<AnswerReceipt, Rejection> {
        let session_id = require_identity(session_id)?;
        if self.session.phase != TriviaPhase::Answering {
            return Err(Rejection::NotAnswering);
        }
        if self.players.get(session_id).is_none() {
            return Err(Rejection::UnknownPlayer);
        }
        let question = self
            .questions
            .get(self.session.current_question_index)
            .ok_or(Rejection::NotAnswering)?;
        if !question.has_option(answer) {
            return Err(Rejection::UnknownOption);
        }

        let is_correct = question.is_correct(answer);
        let question_score = self
            .scoring
            .score(is_correct, self.session.answering_time_remaining);
        let answered_at = self.clock.now();

        let Some(player) = self.players.get_mut(session_id) else {
            return Err(Rejection::UnknownPlayer);
        };
        player.current_answer = Some(answer.to_string());
        player.answered_at = Some(answered_at);
        player.question_score = question_score;
        self.session.submission_count += 1;

        debug!(
            session_id,
            remaining = self.session.answering_time_remaining,
            question_score,
            "answer stored"
        );
        self.events.push(TriviaEvent::StateChanged);

        Ok(AnswerReceipt {
            answer: answer.to_string(),
            answered_at,
        })
    }

    /// Change a player's display name while the lobby is open.
    pub fn rename(&mut self, session_id: &str, new_name: &str) -> Result<String, Rejection> {
        let session_id = require_identity(session_id)?;
        if self.session.phase != TriviaPhase::Waiting {
            return Err(Rejection::GameAlreadyStarted);
        }
        let name = sanitize_name(new_name, self.settings.max_name_length).ok_or(Rejection::EmptyName)?;
        let player = self
            .players
            .get_mut(session_id)
            .ok_or(Rejection::UnknownPlayer)?;

        info!(session_id, from = %player.name, to = %name, "player renamed");
        player.name = name.clone();
        self.events.push(TriviaEvent::StateChanged);
        Ok(name)
    }

    /// Start a game from the lobby.
    pub fn start(&mut self) -> Result<(), Rejection> {
        if self.session.active {
            return Err(Rejection::AlreadyActive);
        }
        if self.session.phase != TriviaPhase::Waiting {
            return Err(Rejection::NotWaiting);
        }
        if self.questions.is_empty() {
            return Err(Rejection::NoQuestions);
        }
        if self.players.is_empty() {
            return Err(Rejection::NoPlayers);
        }

        info!(
            players = self.players.len(),
            questions = self.questions.len(),
            "trivia game started"
        );
        self.session.active = true;
        self.begin_question(0);
        self.events.push(TriviaEvent::StateChanged);
        Ok(())
    }

    /// Return to the lobby from any phase, keeping players but zeroing their scores.
    pub fn reset(&mut self) {
        info!(phase = ?self.session.phase, "trivia game reset");
        self.session = SessionState::new(&self.settings);
        self.players.zero_scores();
        self.players.clear_answers();
        self.events.push(TriviaEvent::StateChanged);
    }

    /// Advance the running game by one countdown second.
    pub fn tick(&mut self) {
        if !self.session.active {
            return;
        }

        match self.session.phase {
            TriviaPhase::Waiting | TriviaPhase::Finished => return,
            TriviaPhase::QuestionDisplay => {
                self.session.question_display_time_remaining =
                    self.session.question_display_time_remaining.saturating_sub(1);
                if self.session.question_display_time_remaining == 0 {
                    self.enter_answering();
                }
            }
            TriviaPhase::Answering => {
                let remaining = self.session.answering_time_remaining.saturating_sub(1);
                self.session.answering_time_remaining = remaining;
                if self.elimination.is_checkpoint(remaining)
                    && self.session.fired_checkpoints.insert(remaining)
                {
                    self.eliminate_option();
                }
                if remaining == 0 {
                    self.enter_results();
                }
            }
            TriviaPhase::Results => {
                self.session.hold_remaining = self.session.hold_remaining.saturating_sub(1);
                if self.session.hold_remaining == 0 {
                    self.leave_results();
                }
            }
            TriviaPhase::Leaderboard => {
                self.session.hold_remaining = self.session.hold_remaining.saturating_sub(1);
                if self.session.hold_remaining == 0 {
                    self.advance_question();
                }
            }
        }

        self.events.push(TriviaEvent::StateChanged);
    }

    fn begin_question(&mut self, index: usize) {
        debug!(index, "showing question");
        self.session.phase = TriviaPhase::QuestionDisplay;
        self.session.current_question_index = index;
        self.session.question_display_time_remaining = self.settings.question_display_secs;
        self.session.answering_time_remaining = self.settings.answering_secs;
        self.session.eliminated_option_indices.clear();
        self.session.fired_checkpoints.clear();
        self.session.submission_count = 0;
        self.session.hold_remaining = 0;
        self.session.scores_folded = false;
        self.players.clear_answers();
    }

    fn enter_answering(&mut self) {
        debug!(index = self.session.current_question_index, "answers open");
        self.session.phase = TriviaPhase::Answering;
        self.session.answering_time_remaining = self.settings.answering_secs;
        self.session.eliminated_option_indices.clear();
    }

    fn eliminate_option(&mut self) {
        let Some(question) = self.questions.get(self.session.current_question_index) else {
            return;
        };
        let picked = self.elimination.pick(
            &mut self.rng,
            question.options.len(),
            question.correct_index,
            &self.session.eliminated_option_indices,
        );
        match picked {
            Some(option_index) => {
                debug!(option_index, "option eliminated");
                self.session.eliminated_option_indices.insert(option_index);
                self.events.push(TriviaEvent::OptionEliminated { option_index });
            }
            None => debug!("no option left to eliminate"),
        }
    }

    fn enter_results(&mut self) {
        self.session.phase = TriviaPhase::Results;
        self.session.hold_remaining = self.settings.results_secs;

        let Some(question) = self.questions.get(self.session.current_question_index) else {
            return;
        };

        if !self.session.scores_folded {
            self.players.fold_question_scores();
            self.session.scores_folded = true;
        }

        let players = self
            .players
            .iter()
            .map(|player| PlayerOutcome {
                session_id: player.session_id.clone(),
                name: player.name.clone(),
                answer: player.current_answer.clone(),
                is_correct: player
                    .current_answer
                    .as_deref()
                    .is_some_and(|answer| question.is_correct(answer)),
                score: player.score,
                question_score: player.question_score,
                answered_at: player.answered_at,
            })
            .collect();

        info!(
            index = self.session.current_question_index,
            answered = self.players.answered_count(),
            "question resolved"
        );
        self.events.push(TriviaEvent::QuestionResolved(QuestionOutcome {
            correct_answer: question.correct_answer().to_string(),
            players,
        }));
    }

    fn leave_results(&mut self) {
        let completed = self.session.current_question_index + 1;
        if completed % self.settings.leaderboard_every.max(1) == 0 {
            self.session.phase = TriviaPhase::Leaderboard;
            self.session.hold_remaining = self.settings.leaderboard_secs;
            self.events.push(TriviaEvent::LeaderboardShown {
                completed,
                total: self.questions.len(),
                standings: self.players.standings(),
            });
        } else {
            self.advance_question();
        }
    }

    fn advance_question(&mut self) {
        let next = self.session.current_question_index + 1;
        if next >= self.questions.len() {
            self.finish();
        } else {
            self.begin_question(next);
        }
    }

    fn finish(&mut self) {
        let standings = self.players.standings();
        info!(
            winner = standings.first().map(|s| s.name.as_str()),
            "trivia game finished"
        );
        self.session.phase = TriviaPhase::Finished;
        self.session.current_question_index = self.questions.len();
        self.session.hold_remaining = 0;
        self.session.active = false;
        self.events.push(TriviaEvent::GameFinished {
            total: self.questions.len(),
            standings,
        });
    }
}

fn require_identity(session_id: &str) -> Result<&str, Rejection> {
    let trimmed = session_id.trim();
    if trimmed.is_empty() {
        Err(Rejection::MissingIdentity)
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::clock::SystemClock;

    fn settings() -> TriviaSettings {
        TriviaSettings {
            leaderboard_every: 2,
            ..TriviaSettings::default()
        }
    }

    fn bank(count: usize) -> Arc<QuestionBank> {
        let questions = (0..count)
            .map(|i| Question::new(format!("Q{i}"), "right", ["w1", "w2", "w3"]))
            .collect();
        Arc::new(QuestionBank::new(questions))
    }

    fn engine_with(settings: TriviaSettings, questions: usize) -> TriviaEngine {
        TriviaEngine::with_rng(
            settings,
            bank(questions),
            Arc::new(SystemClock),
            StdRng::seed_from_u64(11),
        )
    }

    fn engine(questions: usize) -> TriviaEngine {
        engine_with(settings(), questions)
    }

    fn tick_n(engine: &mut TriviaEngine, n: u32) {
        for _ in 0..n {
            engine.tick();
        }
    }

    fn to_answering(engine: &mut TriviaEngine) {
        let display = engine.session().question_display_time_remaining;
        tick_n(engine, display);
        assert_eq!(engine.session().phase, TriviaPhase::Answering);
    }

    #[test]
    fn two_player_scenario_scores_by_time_remaining() {
        let mut engine = engine(3);
        engine.join("a", None).unwrap();
        engine.join("b", None).unwrap();
        engine.start().unwrap();
        to_answering(&mut engine);

        tick_n(&mut engine, 5);
        assert_eq!(engine.session().answering_time_remaining, 35);
        engine.submit_answer("a", "right").unwrap();
        engine.submit_answer("b", "w2").unwrap();
        assert_eq!(engine.players().get("a").unwrap().question_score, 95);
        assert_eq!(engine.players().get("b").unwrap().question_score, 0);

        tick_n(&mut engine, 35);
        assert_eq!(engine.session().phase, TriviaPhase::Results);
        assert_eq!(engine.players().get("a").unwrap().score, 95);
        assert_eq!(engine.players().get("b").unwrap().score, 0);

        let outcome = engine
            .drain_events()
            .into_iter()
            .find_map(|event| match event {
                TriviaEvent::QuestionResolved(outcome) => Some(outcome),
                _ => None,
            })
            .unwrap();
        assert_eq!(outcome.correct_answer, "right");
        assert!(outcome.players[0].is_correct);
        assert!(!outcome.players[1].is_correct);
    }

    #[test]
    fn rename_is_rejected_once_the_game_started() {
        let mut engine = engine(1);
        engine.join("a", None).unwrap();
        engine.start().unwrap();
        to_answering(&mut engine);

        assert_eq!(engine.rename("a", "Bob"), Err(Rejection::GameAlreadyStarted));
        assert_eq!(engine.players().get("a").unwrap().name, "Player 1");
    }

    #[test]
    fn rename_in_lobby_trims_and_truncates() {
        let mut engine = engine(1);
        engine.join("a", None).unwrap();
        let name = engine.rename("a", "   A name longer than twenty chars ").unwrap();
        assert_eq!(name, "A name longer than t");
        assert_eq!(engine.rename("a", "   "), Err(Rejection::EmptyName));
        assert_eq!(engine.rename("zz", "Bob"), Err(Rejection::UnknownPlayer));
        assert_eq!(engine.rename(" ", "Bob"), Err(Rejection::MissingIdentity));
    }

    #[test]
    fn start_requires_an_idle_lobby_with_players() {
        let mut engine = engine(2);
        assert_eq!(engine.start(), Err(Rejection::NoPlayers));

        engine.join("a", None).unwrap();
        engine.start().unwrap();
        let before = engine.session().clone();
        assert_eq!(engine.start(), Err(Rejection::AlreadyActive));
        assert_eq!(engine.session(), &before);

        let mut empty = engine_with(settings(), 0);
        empty.join("a", None).unwrap();
        assert_eq!(empty.start(), Err(Rejection::NoQuestions));
    }

    #[test]
    fn answers_are_gated_by_phase_identity_and_options() {
        let mut engine = engine(1);
        engine.join("a", None).unwrap();
        assert_eq!(engine.submit_answer("a", "right"), Err(Rejection::NotAnswering));

        engine.start().unwrap();
        to_answering(&mut engine);
        assert_eq!(engine.submit_answer("ghost", "right"), Err(Rejection::UnknownPlayer));
        assert_eq!(engine.submit_answer("", "right"), Err(Rejection::MissingIdentity));
        assert_eq!(engine.submit_answer("a", "nope"), Err(Rejection::UnknownOption));
        assert_eq!(engine.session().submission_count, 0);
        assert_eq!(engine.players().get("a").unwrap().current_answer, None);
    }

    #[test]
    fn changing_an_answer_rescores_at_the_new_time() {
        let mut engine = engine(1);
        engine.join("a", None).unwrap();
        engine.start().unwrap();
        to_answering(&mut engine);

        tick_n(&mut engine, 2);
        engine.submit_answer("a", "w1").unwrap();
        assert_eq!(engine.players().get("a").unwrap().question_score, 0);

        tick_n(&mut engine, 8);
        let receipt = engine.submit_answer("a", "right").unwrap();
        assert_eq!(receipt.answer, "right");
        assert_eq!(engine.players().get("a").unwrap().question_score, 90);
        assert_eq!(engine.session().submission_count, 2);
    }

    #[test]
    fn eliminations_fire_once_per_checkpoint_and_spare_the_correct_option() {
        for seed in 0..50 {
            let mut engine = TriviaEngine::with_rng(
                settings(),
                bank(1),
                Arc::new(SystemClock),
                StdRng::seed_from_u64(seed),
            );
            engine.join("a", None).unwrap();
            engine.start().unwrap();
            to_answering(&mut engine);
            engine.drain_events();

            tick_n(&mut engine, 15);
            assert_eq!(engine.session().eliminated_option_indices.len(), 1);
            tick_n(&mut engine, 15);
            assert_eq!(engine.session().eliminated_option_indices.len(), 2);
            tick_n(&mut engine, 9);
            assert_eq!(engine.session().phase, TriviaPhase::Answering);

            let eliminated = engine.session().eliminated_option_indices.clone();
            assert!(!eliminated.contains(&0));
            let announced: BTreeSet<usize> = engine
                .drain_events()
                .into_iter()
                .filter_map(|event| match event {
                    TriviaEvent::OptionEliminated { option_index } => Some(option_index),
                    _ => None,
                })
                .collect();
            assert_eq!(announced, eliminated);
        }
    }

    #[test]
    fn full_game_runs_every_question_then_finishes() {
        let settings = settings();
        let per_question = settings.question_display_secs + settings.answering_secs + settings.results_secs;
        let mut engine = engine_with(settings.clone(), 3);
        engine.join("a", None).unwrap();
        engine.join("b", None).unwrap();
        engine.start().unwrap();

        tick_n(&mut engine, per_question);
        assert_eq!(engine.session().phase, TriviaPhase::QuestionDisplay);
        assert_eq!(engine.session().current_question_index, 1);

        tick_n(&mut engine, per_question);
        assert_eq!(engine.session().phase, TriviaPhase::Leaderboard);
        assert_eq!(engine.session().current_question_index, 1);

        tick_n(&mut engine, settings.leaderboard_secs);
        assert_eq!(engine.session().current_question_index, 2);
        assert_eq!(engine.session().phase, TriviaPhase::QuestionDisplay);

        tick_n(&mut engine, per_question);
        assert_eq!(engine.session().phase, TriviaPhase::Finished);
        assert!(!engine.is_running());

        let events = engine.drain_events();
        let leaderboards = events
            .iter()
            .filter(|event| matches!(event, TriviaEvent::LeaderboardShown { .. }))
            .count();
        assert_eq!(leaderboards, 1);
        assert!(matches!(
            events.last(),
            Some(TriviaEvent::StateChanged)
        ));
        assert!(events.iter().any(|event| matches!(
            event,
            TriviaEvent::GameFinished { total: 3, standings } if standings.len() == 2
        )));

        let frozen = engine.session().clone();
        engine.tick();
        assert_eq!(engine.session(), &frozen);
        assert_eq!(engine.start(), Err(Rejection::NotWaiting));
    }

    #[test]
    fn reset_mid_answering_returns_to_a_clean_lobby() {
        let mut engine = engine(2);
        engine.join("a", None).unwrap();
        engine.start().unwrap();
        to_answering(&mut engine);
        engine.submit_answer("a", "right").unwrap();
        tick_n(&mut engine, 40);
        tick_n(&mut engine, 5);
        to_answering(&mut engine);
        tick_n(&mut engine, 20);
        assert!(!engine.session().eliminated_option_indices.is_empty());
        assert!(engine.players().get("a").unwrap().score > 0);

        engine.reset();
        let session = engine.session();
        assert_eq!(session.phase, TriviaPhase::Waiting);
        assert!(!session.active);
        assert!(session.eliminated_option_indices.is_empty());
        assert_eq!(session.current_question_index, 0);
        assert_eq!(engine.players().len(), 1);
        assert_eq!(engine.players().get("a").unwrap().score, 0);

        engine.start().unwrap();
        assert_eq!(engine.session().current_question_index, 0);
        assert_eq!(engine.session().phase, TriviaPhase::QuestionDisplay);
    }

    #[test]
    fn leaving_discards_the_player_and_rejoining_starts_fresh() {
        let mut engine = engine(1);
        engine.join("a", None).unwrap();
        engine.start().unwrap();
        to_answering(&mut engine);
        engine.submit_answer("a", "right").unwrap();
        tick_n(&mut engine, 40);
        assert!(engine.players().get("a").unwrap().score > 0);

        assert!(engine.leave("a").is_some());
        assert!(engine.leave("a").is_none());
        let player = engine.join("a", None).unwrap();
        assert_eq!(player.score, 0);
    }

    #[test]
    fn answers_are_cleared_when_the_next_question_begins() {
        let mut engine = engine(2);
        engine.join("a", None).unwrap();
        engine.start().unwrap();
        to_answering(&mut engine);
        engine.submit_answer("a", "w3").unwrap();
        tick_n(&mut engine, 40 + 5);

        assert_eq!(engine.session().phase, TriviaPhase::QuestionDisplay);
        assert_eq!(engine.session().current_question_index, 1);
        assert_eq!(engine.players().get("a").unwrap().current_answer, None);
        assert_eq!(engine.players().answered_count(), 0);
        assert_eq!(engine.session().submission_count, 0);
    }
}
