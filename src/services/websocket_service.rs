use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    dto::ws::{ClientMessage, ServerMessage},
    services::{content_service, device_service, trivia_service},
    state::{
        SharedState,
        clients::{Broadcaster, ConnectionId},
    },
};

/// Handle the full lifecycle of a player or display WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let connection = state.clients().register(outbound_tx.clone());
    info!(%connection, clients = state.clients().len(), "client connected");

    send_initial_state(&state, connection).await;

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match ClientMessage::from_json_str(&text) {
                Ok(message) => dispatch(&state, connection, message).await,
                Err(err) => {
                    warn!(%connection, error = %err, "failed to parse client message");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(%connection, "client closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(%connection, error = %err, "websocket error");
                break;
            }
        }
    }

    if let Some(session_id) = state.clients().unregister(connection) {
        info!(%connection, %session_id, "last connection of player closed");
        trivia_service::leave_if_orphaned(&state, session_id).await;
    }
    info!(%connection, "client disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Push the active content, if any, and the current trivia snapshot to a fresh connection.
async fn send_initial_state(state: &SharedState, connection: ConnectionId) {
    send_active_content(state, connection).await;

    match trivia_service::snapshot(state).await {
        Ok(snapshot) => reply(
            state,
            connection,
            ServerMessage::GameStateUpdate(Box::new(snapshot)),
        ),
        Err(err) => warn!(%connection, error = %err, "failed to load trivia snapshot"),
    }
}

/// Route one decoded client message and answer on the same connection.
async fn dispatch(state: &SharedState, connection: ConnectionId, message: ClientMessage) {
    match message {
        ClientMessage::JoinTriviaGame(request) => {
            let ack = trivia_service::join(state, connection, request).await;
            reply(state, connection, ServerMessage::PlayerJoined(ack));
        }
        ClientMessage::SubmitAnswer(request) => {
            let ack = trivia_service::submit_answer(state, request).await;
            reply(state, connection, ServerMessage::AnswerSubmitted(ack));
        }
        ClientMessage::UpdatePlayerName(request) => {
            let ack = trivia_service::rename(state, request).await;
            reply(state, connection, ServerMessage::NameUpdateResponse(ack));
        }
        ClientMessage::StartTriviaGame => {
            let ack = trivia_service::start(state).await;
            reply(state, connection, ServerMessage::GameStartResponse(ack));
        }
        ClientMessage::ResetTriviaGame => {
            let ack = trivia_service::reset(state).await;
            reply(state, connection, ServerMessage::GameResetResponse(ack));
        }
        ClientMessage::GetGameState => match trivia_service::snapshot(state).await {
            Ok(snapshot) => reply(
                state,
                connection,
                ServerMessage::GameStateUpdate(Box::new(snapshot)),
            ),
            Err(err) => warn!(%connection, error = %err, "failed to load trivia snapshot"),
        },
        ClientMessage::GetActiveContent => send_active_content(state, connection).await,
        ClientMessage::DeviceHeartbeat(request) => {
            device_service::record_heartbeat(state, request);
        }
    }
}

/// Unicast `content_update`; nothing is sent while no item is active.
async fn send_active_content(state: &SharedState, connection: ConnectionId) {
    match content_service::active_update(state).await {
        Ok(Some(update)) => reply(state, connection, ServerMessage::ContentUpdate(update)),
        Ok(None) => debug!(%connection, "no active content to send"),
        Err(err) => warn!(%connection, error = %err, "failed to load active content"),
    }
}

fn reply(state: &SharedState, connection: ConnectionId, message: ServerMessage) {
    state.clients().send_to(connection, &message);
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
