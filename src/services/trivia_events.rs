use crate::{
    dto::{
        trivia::{
            EliminateWrongAnswer, GameFinished, GameStateSnapshot, LeaderboardEntry,
            QuestionResults, ShowLeaderboard,
        },
        ws::ServerMessage,
    },
    state::{
        clients::Broadcaster,
        players::Standing,
        state_machine::{TriviaEngine, TriviaEvent},
    },
};

/// Full snapshot of the engine as a `game_state_update` frame.
pub fn state_update(engine: &TriviaEngine) -> ServerMessage {
    ServerMessage::GameStateUpdate(Box::new(GameStateSnapshot::from(engine)))
}

/// Render the queued engine events into wire messages.
///
/// Discrete events keep their order. Any number of state changes collapse into
/// a single trailing `game_state_update`, since clients re-render the full snapshot.
pub fn render(engine: &TriviaEngine, events: Vec<TriviaEvent>) -> Vec<ServerMessage> {
    let mut state_changed = false;
    let mut messages: Vec<ServerMessage> = events
        .into_iter()
        .filter_map(|event| match event {
            TriviaEvent::StateChanged => {
                state_changed = true;
                None
            }
            TriviaEvent::OptionEliminated { option_index } => {
                Some(ServerMessage::EliminateWrongAnswer(EliminateWrongAnswer {
                    answer_index: option_index,
                }))
            }
            TriviaEvent::QuestionResolved(outcome) => {
                Some(ServerMessage::QuestionResults(QuestionResults {
                    correct_answer: outcome.correct_answer,
                    player_results: outcome.players.into_iter().map(Into::into).collect(),
                }))
            }
            TriviaEvent::LeaderboardShown {
                completed,
                total,
                standings,
            } => Some(ServerMessage::ShowLeaderboard(ShowLeaderboard {
                current_question: completed,
                total_questions: total,
                leaderboard: entries(standings),
            })),
            TriviaEvent::GameFinished { total, standings } => {
                Some(ServerMessage::GameFinished(GameFinished {
                    final_results: entries(standings),
                    total_questions: total,
                }))
            }
        })
        .collect();

    if state_changed {
        messages.push(state_update(engine));
    }
    messages
}

/// Drain the engine's outbox and broadcast it to every client.
pub fn publish(engine: &mut TriviaEngine, broadcaster: &dyn Broadcaster) {
    let events = engine.drain_events();
    if events.is_empty() {
        return;
    }
    for message in render(engine, events) {
        broadcaster.broadcast_all(&message);
    }
}

fn entries(standings: Vec<Standing>) -> Vec<LeaderboardEntry> {
    standings.into_iter().map(Into::into).collect()
}
