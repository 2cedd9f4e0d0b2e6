use tracing::{info, warn};
use validator::Validate;

use crate::{
    dto::{
        trivia::{GameStateSnapshot, PlayerSnapshot},
        ws::{AnswerAck, CommandAck, JoinAck, JoinRequest, RenameAck, RenameRequest, SubmitAnswerRequest},
    },
    error::ServiceError,
    services::device_service,
    state::{SharedState, clients::ConnectionId},
};

/// Join the trivia lobby and bind `connection` to the joined identity.
///
/// The connection is bound before the engine sees the join, so a sibling tab
/// closing meanwhile never finds the identity unbound.
pub async fn join(state: &SharedState, connection: ConnectionId, request: JoinRequest) -> JoinAck {
    if let Err(err) = request.validate() {
        return JoinAck::rejected(ServiceError::from(err));
    }

    let previous = state.clients().session_of(connection);
    let orphan = state.clients().bind(connection, &request.session_id);

    let player = match state
        .trivia()
        .join(request.session_id.clone(), request.user_agent.clone())
        .await
    {
        Ok(player) => player,
        Err(err) => {
            state.clients().restore(connection, previous);
            return JoinAck::rejected(err);
        }
    };
    device_service::record_join(state, &player.session_id, request.user_agent);

    if let Some(orphan) = orphan {
        info!(%connection, session_id = %orphan, "connection switched identity");
        leave_if_orphaned(state, orphan).await;
    }

    JoinAck::accepted(PlayerSnapshot::from(&player))
}

/// Remove `session_id` unless a connection is bound to it by the time the
/// trivia actor applies the leave.
pub async fn leave_if_orphaned(state: &SharedState, session_id: String) {
    let guard_state = state.clone();
    let guarded_id = session_id.clone();
    let still_orphaned = move || !guard_state.clients().is_bound(&guarded_id);
    if let Err(err) = state.trivia().leave(session_id, still_orphaned).await {
        warn!(error = %err, "failed to remove orphaned player");
    }
}

/// Store or replace the player's answer for the current question.
pub async fn submit_answer(state: &SharedState, request: SubmitAnswerRequest) -> AnswerAck {
    if let Err(err) = request.validate() {
        return AnswerAck::rejected(ServiceError::from(err));
    }

    match state
        .trivia()
        .submit_answer(request.session_id, request.answer)
        .await
    {
        Ok(receipt) => AnswerAck::accepted(receipt),
        Err(err) => AnswerAck::rejected(err),
    }
}

/// Rename a player while the lobby is open.
pub async fn rename(state: &SharedState, request: RenameRequest) -> RenameAck {
    if let Err(err) = request.validate() {
        return RenameAck::rejected(ServiceError::from(err));
    }

    match state
        .trivia()
        .rename(request.session_id, request.new_name)
        .await
    {
        Ok(name) => RenameAck::accepted(name),
        Err(err) => RenameAck::rejected(err),
    }
}

/// Start a game from the lobby.
pub async fn start(state: &SharedState) -> CommandAck {
    match state.trivia().start().await {
        Ok(()) => CommandAck::accepted(),
        Err(err) => {
            info!(reason = %err, "start rejected");
            CommandAck::rejected(err)
        }
    }
}

/// Return to the lobby, zeroing scores.
pub async fn reset(state: &SharedState) -> CommandAck {
    match state.trivia().reset().await {
        Ok(()) => CommandAck::accepted(),
        Err(err) => CommandAck::rejected(err),
    }
}

/// Current full snapshot.
pub async fn snapshot(state: &SharedState) -> Result<GameStateSnapshot, ServiceError> {
    state.trivia().snapshot().await
}
