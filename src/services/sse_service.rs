use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::{sse::ServerEvent, ws::ServerMessage},
    services::{content_service, trivia_service},
    state::SharedState,
};

/// Subscribe to the display stream and collect the frames a fresh screen needs
/// to render: the active content and the current trivia snapshot.
///
/// The subscription is taken first so nothing broadcast in between is lost.
pub async fn subscribe_display(
    state: &SharedState,
) -> (broadcast::Receiver<ServerEvent>, Vec<ServerEvent>) {
    let receiver = state.display_sse().subscribe();
    let mut initial = Vec::with_capacity(2);

    match content_service::active_update(state).await {
        Ok(Some(update)) => push(&mut initial, &ServerMessage::ContentUpdate(update)),
        Ok(None) => {}
        Err(err) => warn!(error = %err, "display stream opened without content"),
    }
    match trivia_service::snapshot(state).await {
        Ok(snapshot) => push(
            &mut initial,
            &ServerMessage::GameStateUpdate(Box::new(snapshot)),
        ),
        Err(err) => warn!(error = %err, "display stream opened without trivia snapshot"),
    }

    (receiver, initial)
}

fn push(events: &mut Vec<ServerEvent>, message: &ServerMessage) {
    match ServerEvent::from_message(message) {
        Ok(event) => events.push(event),
        Err(err) => warn!(error = %err, "failed to encode initial display event"),
    }
}

fn to_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}

/// Convert a broadcast receiver into an SSE response, replaying `initial`
/// first and cleaning up once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    initial: Vec<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        for payload in initial {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                info!("display SSE stream disconnected");
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            // The next snapshot supersedes whatever was skipped.
                            warn!(skipped, "display SSE stream lagged");
                            continue;
                        }
                    }
                }
            }
        }

        info!("display SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::Value;

    use super::*;
    use crate::{dao::content_store::InMemoryContentStore, state::AppState};

    fn names(events: &[ServerEvent]) -> Vec<&str> {
        events.iter().filter_map(|event| event.event.as_deref()).collect()
    }

    #[tokio::test]
    async fn fresh_display_gets_flat_content_then_snapshot() {
        let state = AppState::for_tests();
        let (_receiver, initial) = subscribe_display(&state).await;

        assert_eq!(names(&initial), ["content_update", "game_state_update"]);
        let content: Value = serde_json::from_str(&initial[0].data).unwrap();
        assert_eq!(content["title"], "Welcome to the Game Hub");
        assert!(content.get("content_type").is_some());
        assert!(content.get("content").is_none());
    }

    #[tokio::test]
    async fn nothing_active_sends_no_content_update() {
        let state = AppState::for_tests_with(Arc::new(InMemoryContentStore::new(Vec::new())));
        let (_receiver, initial) = subscribe_display(&state).await;
        assert_eq!(names(&initial), ["game_state_update"]);
    }
}
