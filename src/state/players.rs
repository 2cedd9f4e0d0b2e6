use std::time::SystemTime;

use indexmap::IndexMap;

/// Maximum display name length when the config does not override it.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 20;

/// Player tracked for the lifetime of their connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Stable per-browser-session identity.
    pub session_id: String,
    /// Display name, editable while the game is waiting.
    pub name: String,
    /// Cumulative score over the questions already resolved.
    pub score: u32,
    /// Answer submitted for the current question, if any.
    pub current_answer: Option<String>,
    /// When the current answer was submitted.
    pub answered_at: Option<SystemTime>,
    /// Live score of the current answer, folded into `score` when the question resolves.
    pub question_score: u32,
    /// Browser user agent reported at join time.
    pub user_agent: Option<String>,
    /// When the player first joined.
    pub joined_at: SystemTime,
}

impl Player {
    fn new(session_id: String, name: String, user_agent: Option<String>, now: SystemTime) -> Self {
        Self {
            session_id,
            name,
            score: 0,
            current_answer: None,
            answered_at: None,
            question_score: 0,
            user_agent,
            joined_at: now,
        }
    }

    /// Forget everything about the current question.
    pub fn clear_answer(&mut self) {
        self.current_answer = None;
        self.answered_at = None;
        self.question_score = 0;
    }
}

/// Final or intermediate position of a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// 1-based position.
    pub rank: usize,
    /// Identity of the ranked player.
    pub session_id: String,
    /// Display name at ranking time.
    pub name: String,
    /// Cumulative score at ranking time.
    pub score: u32,
}

/// Players keyed by identity, iterated in join order.
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    players: IndexMap<String, Player>,
}

impl PlayerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session_id`, or return the existing player untouched.
    ///
    /// The boolean is `true` when the player was created by this call.
    pub fn join(
        &mut self,
        session_id: &str,
        user_agent: Option<String>,
        now: SystemTime,
    ) -> (&Player, bool) {
        let next_number = self.players.len() + 1;
        let created = !self.players.contains_key(session_id);
        let player = self
            .players
            .entry(session_id.to_string())
            .or_insert_with(|| {
                Player::new(
                    session_id.to_string(),
                    format!("Player {next_number}"),
                    user_agent,
                    now,
                )
            });
        (player, created)
    }

    /// Remove a player, keeping the join order of the others.
    pub fn remove(&mut self, session_id: &str) -> Option<Player> {
        self.players.shift_remove(session_id)
    }

    /// Look up a player.
    pub fn get(&self, session_id: &str) -> Option<&Player> {
        self.players.get(session_id)
    }

    /// Look up a player for mutation.
    pub fn get_mut(&mut self, session_id: &str) -> Option<&mut Player> {
        self.players.get_mut(session_id)
    }

    /// Players in join order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Number of registered players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether nobody joined.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Players holding an answer for the current question.
    pub fn answered_count(&self) -> usize {
        self.iter()
            .filter(|player| player.current_answer.is_some())
            .count()
    }

    /// Drop every player's per-question state.
    pub fn clear_answers(&mut self) {
        self.players.values_mut().for_each(Player::clear_answer);
    }

    /// Add every player's live question score to their cumulative score.
    pub fn fold_question_scores(&mut self) {
        for player in self.players.values_mut() {
            player.score = player.score.saturating_add(player.question_score);
        }
    }

    /// Reset every cumulative score to zero.
    pub fn zero_scores(&mut self) {
        self.players
            .values_mut()
            .for_each(|player| player.score = 0);
    }

    /// Rank players by score, highest first; equal scores keep join order.
    pub fn standings(&self) -> Vec<Standing> {
        let mut ranked: Vec<&Player> = self.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
            .into_iter()
            .enumerate()
            .map(|(position, player)| Standing {
                rank: position + 1,
                session_id: player.session_id.clone(),
                name: player.name.clone(),
                score: player.score,
            })
            .collect()
    }
}

/// Trim a requested display name and cut it to `max_len` characters.
///
/// Returns `None` when nothing printable is left.
pub fn sanitize_name(raw: &str, max_len: usize) -> Option<String> {
    let truncated: String = raw.trim().chars().take(max_len).collect();
    let name = truncated.trim_end();
    (!name.is_empty()).then(|| name.to_string())
}
