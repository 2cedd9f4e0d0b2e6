//! Actor owning the [`TriviaEngine`]: commands and countdown ticks are
//! serialized through a single task, so no lock guards the session.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{Instant, Interval, MissedTickBehavior, interval_at},
};
use tracing::{debug, info};

use crate::{
    dto::trivia::GameStateSnapshot,
    error::ServiceError,
    services::trivia_events,
    state::{
        clients::Broadcaster,
        players::Player,
        state_machine::{AnswerReceipt, Rejection, TriviaEngine},
    },
};

/// Pending commands before senders start waiting.
const COMMAND_CAPACITY: usize = 64;

type Reply<T> = oneshot::Sender<T>;

/// Checked by the actor right before a leave is applied.
type LeaveGuard = Box<dyn FnOnce() -> bool + Send>;

/// Requests handled by the trivia actor.
enum TriviaCommand {
    Join {
        session_id: String,
        user_agent: Option<String>,
        reply: Reply<Result<Player, Rejection>>,
    },
    Leave {
        session_id: String,
        still_orphaned: LeaveGuard,
    },
    SubmitAnswer {
        session_id: String,
        answer: String,
        reply: Reply<Result<AnswerReceipt, Rejection>>,
    },
    Rename {
        session_id: String,
        new_name: String,
        reply: Reply<Result<String, Rejection>>,
    },
    Start {
        reply: Reply<Result<(), Rejection>>,
    },
    Reset {
        reply: Reply<()>,
    },
    Snapshot {
        reply: Reply<GameStateSnapshot>,
    },
}

/// Cloneable front door of the trivia actor.
#[derive(Clone)]
pub struct TriviaHandle {
    commands: mpsc::Sender<TriviaCommand>,
}

impl TriviaHandle {
    /// Spawn the actor. Every observable change is pushed through `broadcaster`.
    pub fn spawn(
        engine: TriviaEngine,
        tick_period: Duration,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let task = tokio::spawn(run(engine, rx, tick_period, broadcaster));
        (Self { commands: tx }, task)
    }

    /// Register a player, or return the existing record for this identity.
    pub async fn join(
        &self,
        session_id: String,
        user_agent: Option<String>,
    ) -> Result<Player, ServiceError> {
        self.request(|reply| TriviaCommand::Join {
            session_id,
            user_agent,
            reply,
        })
        .await?
        .map_err(Into::into)
    }

    /// Drop a player whose last connection closed.
    ///
    /// `still_orphaned` runs inside the actor, after every command queued before
    /// this one, so a connection that rebound the identity meanwhile keeps the player.
    pub async fn leave(
        &self,
        session_id: String,
        still_orphaned: impl FnOnce() -> bool + Send + 'static,
    ) -> Result<(), ServiceError> {
        self.commands
            .send(TriviaCommand::Leave {
                session_id,
                still_orphaned: Box::new(still_orphaned),
            })
            .await
            .map_err(|_| ServiceError::EngineUnavailable)
    }

    /// Store or replace an answer for the current question.
    pub async fn submit_answer(
        &self,
        session_id: String,
        answer: String,
    ) -> Result<AnswerReceipt, ServiceError> {
        self.request(|reply| TriviaCommand::SubmitAnswer {
            session_id,
            answer,
            reply,
        })
        .await?
        .map_err(Into::into)
    }

    /// Rename a player while the lobby is open.
    pub async fn rename(&self, session_id: String, new_name: String) -> Result<String, ServiceError> {
        self.request(|reply| TriviaCommand::Rename {
            session_id,
            new_name,
            reply,
        })
        .await?
        .map_err(Into::into)
    }

    /// Start a game.
    pub async fn start(&self) -> Result<(), ServiceError> {
        self.request(|reply| TriviaCommand::Start { reply })
            .await?
            .map_err(Into::into)
    }

    /// Cancel the running countdown and return to the lobby.
    pub async fn reset(&self) -> Result<(), ServiceError> {
        self.request(|reply| TriviaCommand::Reset { reply }).await
    }

    /// Current full snapshot.
    pub async fn snapshot(&self) -> Result<GameStateSnapshot, ServiceError> {
        self.request(|reply| TriviaCommand::Snapshot { reply }).await
    }

    /// Whether the actor task is still receiving commands.
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> TriviaCommand,
    ) -> Result<T, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| ServiceError::EngineUnavailable)?;
        response.await.map_err(|_| ServiceError::EngineUnavailable)
    }
}

async fn run(
    mut engine: TriviaEngine,
    mut commands: mpsc::Receiver<TriviaCommand>,
    tick_period: Duration,
    broadcaster: Arc<dyn Broadcaster>,
) {
    info!(period_ms = tick_period.as_millis() as u64, "trivia runtime started");
    let mut ticker: Option<Interval> = None;

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                handle(&mut engine, command, broadcaster.as_ref());
            }
            _ = next_tick(&mut ticker) => {
                engine.tick();
                trivia_events::publish(&mut engine, broadcaster.as_ref());
            }
        }

        sync_ticker(&engine, &mut ticker, tick_period);
    }

    info!("trivia runtime stopped");
}

/// Apply one command. The resulting broadcast goes out before the reply, so a
/// client sees the new state ahead of its own ack.
fn handle(engine: &mut TriviaEngine, command: TriviaCommand, broadcaster: &dyn Broadcaster) {
    match command {
        TriviaCommand::Join {
            session_id,
            user_agent,
            reply,
        } => {
            let result = engine.join(&session_id, user_agent);
            trivia_events::publish(engine, broadcaster);
            let _ = reply.send(result);
        }
        TriviaCommand::Leave {
            session_id,
            still_orphaned,
        } => {
            if still_orphaned() {
                engine.leave(&session_id);
                trivia_events::publish(engine, broadcaster);
            } else {
                debug!(%session_id, "identity rebound before leave; player kept");
            }
        }
        TriviaCommand::SubmitAnswer {
            session_id,
            answer,
            reply,
        } => {
            let result = engine.submit_answer(&session_id, &answer);
            trivia_events::publish(engine, broadcaster);
            let _ = reply.send(result);
        }
        TriviaCommand::Rename {
            session_id,
            new_name,
            reply,
        } => {
            let result = engine.rename(&session_id, &new_name);
            trivia_events::publish(engine, broadcaster);
            let _ = reply.send(result);
        }
        TriviaCommand::Start { reply } => {
            let result = engine.start();
            trivia_events::publish(engine, broadcaster);
            let _ = reply.send(result);
        }
        TriviaCommand::Reset { reply } => {
            engine.reset();
            trivia_events::publish(engine, broadcaster);
            let _ = reply.send(());
        }
        TriviaCommand::Snapshot { reply } => {
            let _ = reply.send(GameStateSnapshot::from(&*engine));
        }
    }
}

/// Keep exactly one interval alive while the engine runs, none otherwise.
fn sync_ticker(engine: &TriviaEngine, ticker: &mut Option<Interval>, period: Duration) {
    match (engine.is_running(), ticker.is_some()) {
        (true, false) => {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            *ticker = Some(interval);
            debug!("countdown armed");
        }
        (false, true) => {
            *ticker = None;
            debug!("countdown cancelled");
        }
        _ => {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        config::TriviaSettings,
        dto::ws::ServerMessage,
        state::{
            clients::ConnectionId,
            clock::SystemClock,
            questions::{Question, QuestionBank},
        },
    };

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn names(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn count(&self, name: &str) -> usize {
            self.names().iter().filter(|event| *event == name).count()
        }
    }

    impl Broadcaster for Recorder {
        fn broadcast_all(&self, message: &ServerMessage) {
            self.events
                .lock()
                .unwrap()
                .push(message.event_name().to_string());
        }

        fn send_to(&self, _connection: ConnectionId, _message: &ServerMessage) {}
    }

    fn spawn(settings: TriviaSettings, questions: usize) -> (TriviaHandle, Arc<Recorder>) {
        let bank = (0..questions)
            .map(|i| Question::new(format!("Q{i}"), "right", ["a", "b", "c"]))
            .collect();
        let engine = TriviaEngine::with_rng(
            settings.clone(),
            Arc::new(QuestionBank::new(bank)),
            Arc::new(SystemClock),
            StdRng::seed_from_u64(9),
        );
        let recorder = Arc::new(Recorder::default());
        let (handle, _task) = TriviaHandle::spawn(engine, settings.tick_period, recorder.clone());
        (handle, recorder)
    }

    /// Start the game, then sit half a tick off the countdown so every
    /// observation lands strictly between two ticks.
    async fn start_game(handle: &TriviaHandle) {
        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    async fn advance_secs(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_moves_to_answering_after_display_time() {
        let (handle, recorder) = spawn(TriviaSettings::default(), 2);
        handle.join("p1".into(), None).await.unwrap();
        start_game(&handle).await;

        advance_secs(3).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.question_display_time_remaining, 7);

        advance_secs(7).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.answering_time_remaining, 40);
        assert!(recorder.count("game_state_update") >= 12);
    }

    #[tokio::test(start_paused = true)]
    async fn submitted_answer_is_scored_and_resolved() {
        let (handle, recorder) = spawn(TriviaSettings::default(), 1);
        handle.join("p1".into(), None).await.unwrap();
        start_game(&handle).await;
        advance_secs(15).await;

        let receipt = handle
            .submit_answer("p1".into(), "right".into())
            .await
            .unwrap();
        assert_eq!(receipt.answer, "right");

        advance_secs(35).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.players[0].score, 95);
        assert_eq!(recorder.count("question_results"), 1);
        assert_eq!(recorder.count("eliminate_wrong_answer"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_commands_surface_as_service_errors() {
        let (handle, _recorder) = spawn(TriviaSettings::default(), 1);
        let err = handle.start().await.unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(Rejection::NoPlayers)));

        handle.join("p1".into(), None).await.unwrap();
        handle.start().await.unwrap();
        let err = handle.rename("p1".into(), "Bob".into()).await.unwrap_err();
        assert_eq!(err.to_string(), "game already started");
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_the_countdown() {
        let (handle, _recorder) = spawn(TriviaSettings::default(), 2);
        handle.join("p1".into(), None).await.unwrap();
        start_game(&handle).await;
        advance_secs(12).await;

        handle.reset().await.unwrap();
        advance_secs(30).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.active);
        assert_eq!(snapshot.question_display_time_remaining, 10);
        assert_eq!(snapshot.answering_time_remaining, 40);
        assert_eq!(snapshot.players.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn full_game_finishes_and_stops_ticking() {
        let settings = TriviaSettings {
            question_display_secs: 1,
            answering_secs: 3,
            results_secs: 1,
            leaderboard_secs: 1,
            leaderboard_every: 5,
            elimination_checkpoints: vec![2],
            ..TriviaSettings::default()
        };
        let (handle, recorder) = spawn(settings, 2);
        handle.join("p1".into(), None).await.unwrap();
        start_game(&handle).await;

        advance_secs(20).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.active);
        assert_eq!(recorder.count("game_finished"), 1);
        assert_eq!(recorder.count("question_results"), 2);

        let updates = recorder.count("game_state_update");
        advance_secs(10).await;
        assert_eq!(recorder.count("game_state_update"), updates);
    }

    #[tokio::test]
    async fn leave_is_skipped_once_the_identity_is_rebound() {
        let (handle, _recorder) = spawn(TriviaSettings::default(), 1);
        handle.join("p1".into(), None).await.unwrap();
        handle.join("p2".into(), None).await.unwrap();

        handle.leave("p1".into(), || false).await.unwrap();
        handle.leave("p2".into(), || true).await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        let ids: Vec<_> = snapshot.players.iter().map(|p| p.session_id.as_str()).collect();
        assert_eq!(ids, ["p1"]);
    }

    #[tokio::test]
    async fn dropped_actor_reports_unavailable() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = TriviaHandle { commands: tx };
        assert!(!handle.is_running());
        assert!(matches!(
            handle.snapshot().await,
            Err(ServiceError::EngineUnavailable)
        ));
    }
}
