//! Broadcast gateway: every live WebSocket connection plus the display SSE hub.

use axum::extract::ws::{Message, Utf8Bytes};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dto::{sse::ServerEvent, ws::ServerMessage},
    state::sse::SseHub,
};

/// Identifier of one WebSocket connection (not of a player).
pub type ConnectionId = Uuid;

/// Fan-out seam between the trivia runtime and connected clients.
pub trait Broadcaster: Send + Sync {
    /// Deliver `message` to every connected client. Failures are dropped.
    fn broadcast_all(&self, message: &ServerMessage);
    /// Deliver `message` to a single connection. Failures are dropped.
    fn send_to(&self, connection: ConnectionId, message: &ServerMessage);
}

#[derive(Clone)]
/// Handle used to push messages to a connected client.
pub struct ClientConnection {
    /// Outbound queue drained by the socket writer task.
    pub tx: mpsc::UnboundedSender<Message>,
    /// Identity this connection joined with, if any.
    pub session_id: Option<String>,
}

/// Registry of live connections keyed by [`ConnectionId`].
pub struct ClientHub {
    connections: DashMap<ConnectionId, ClientConnection>,
    display: SseHub,
}

impl ClientHub {
    /// Empty hub whose display stream buffers `display_capacity` events.
    pub fn new(display_capacity: usize) -> Self {
        Self {
            connections: DashMap::new(),
            display: SseHub::new(display_capacity),
        }
    }

    /// Track a new socket and return its identifier.
    pub fn register(&self, tx: mpsc::UnboundedSender<Message>) -> ConnectionId {
        let id = Uuid::new_v4();
        self.connections.insert(
            id,
            ClientConnection {
                tx,
                session_id: None,
            },
        );
        id
    }

    /// Bind `connection` to a player identity.
    ///
    /// Returns the identity it was previously bound to when no other connection
    /// still holds it, so the caller can drop that player.
    pub fn bind(&self, connection: ConnectionId, session_id: &str) -> Option<String> {
        let previous = {
            let mut entry = self.connections.get_mut(&connection)?;
            entry.session_id.replace(session_id.to_string())
        };
        previous.filter(|old| old != session_id && !self.is_bound(old))
    }

    /// Forget `connection`. Returns its identity when it was the last connection bound to it.
    pub fn unregister(&self, connection: ConnectionId) -> Option<String> {
        let (_, removed) = self.connections.remove(&connection)?;
        let session_id = removed.session_id?;
        (!self.is_bound(&session_id)).then_some(session_id)
    }

    /// Put back the binding `connection` had before a [`bind`](Self::bind) that
    /// the engine then refused.
    pub fn restore(&self, connection: ConnectionId, previous: Option<String>) {
        if let Some(mut entry) = self.connections.get_mut(&connection) {
            entry.session_id = previous;
        }
    }

    /// Identity bound to `connection`, if any.
    pub fn session_of(&self, connection: ConnectionId) -> Option<String> {
        self.connections
            .get(&connection)
            .and_then(|entry| entry.session_id.clone())
    }

    /// Number of live WebSocket connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no WebSocket is connected.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Hub feeding `/sse/display`.
    pub fn display(&self) -> &SseHub {
        &self.display
    }

    /// Whether any live connection is bound to `session_id`.
    pub fn is_bound(&self, session_id: &str) -> bool {
        self.connections
            .iter()
            .any(|entry| entry.session_id.as_deref() == Some(session_id))
    }
}

fn encode(message: &ServerMessage) -> Option<Utf8Bytes> {
    match message.to_frame() {
        Ok(frame) => Some(frame.into()),
        Err(err) => {
            warn!(event = message.event_name(), error = %err, "failed to serialize outbound message");
            None
        }
    }
}

impl Broadcaster for ClientHub {
    fn broadcast_all(&self, message: &ServerMessage) {
        let Some(frame) = encode(message) else {
            return;
        };

        let mut delivered = 0usize;
        for entry in self.connections.iter() {
            if entry.tx.send(Message::Text(frame.clone())).is_ok() {
                delivered += 1;
            }
        }
        debug!(event = message.event_name(), delivered, "broadcast");

        match ServerEvent::from_message(message) {
            Ok(event) => self.display.broadcast(event),
            Err(err) => warn!(error = %err, "failed to mirror message to display stream"),
        }
    }

    fn send_to(&self, connection: ConnectionId, message: &ServerMessage) {
        let Some(tx) = self.connections.get(&connection).map(|entry| entry.tx.clone()) else {
            debug!(%connection, event = message.event_name(), "unicast to unknown connection dropped");
            return;
        };
        if let Some(frame) = encode(message) {
            let _ = tx.send(Message::Text(frame));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::ws::CommandAck;

    fn text(message: Message) -> String {
        match message {
            Message::Text(text) => text.as_str().to_owned(),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn broadcast_reaches_every_connection_and_the_display() {
        let hub = ClientHub::new(8);
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        hub.register(tx_a);
        hub.register(tx_b);
        let mut display = hub.display().subscribe();

        hub.broadcast_all(&ServerMessage::GameResetResponse(CommandAck::accepted()));

        for rx in [&mut rx_a, &mut rx_b] {
            let frame = text(rx.try_recv().unwrap());
            assert!(frame.contains("\"game_reset_response\""));
        }
        let event = display.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some("game_reset_response"));
    }

    #[test]
    fn closed_connections_do_not_block_delivery() {
        let hub = ClientHub::new(8);
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        hub.register(tx_dead);
        hub.register(tx_live);
        drop(rx_dead);

        hub.broadcast_all(&ServerMessage::GameStartResponse(CommandAck::accepted()));
        assert!(rx_live.try_recv().is_ok());
    }

    #[test]
    fn unicast_targets_one_connection() {
        let hub = ClientHub::new(8);
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = hub.register(tx_a);
        hub.register(tx_b);

        hub.send_to(a, &ServerMessage::GameStartResponse(CommandAck::rejected("no players have joined")));
        assert!(text(rx_a.try_recv().unwrap()).contains("no players have joined"));
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn identity_is_released_with_its_last_connection() {
        let hub = ClientHub::new(8);
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        let a = hub.register(tx_a);
        let b = hub.register(tx_b);
        assert_eq!(hub.bind(a, "player-1"), None);
        assert_eq!(hub.bind(b, "player-1"), None);

        assert_eq!(hub.unregister(a), None);
        assert_eq!(hub.session_of(b).as_deref(), Some("player-1"));
        assert_eq!(hub.unregister(b).as_deref(), Some("player-1"));
        assert!(hub.is_empty());
    }

    #[test]
    fn rebinding_releases_the_orphaned_identity() {
        let hub = ClientHub::new(8);
        let (tx, _rx) = mpsc::unbounded_channel();
        let a = hub.register(tx);
        hub.bind(a, "old");
        assert_eq!(hub.bind(a, "old"), None);
        assert_eq!(hub.bind(a, "new").as_deref(), Some("old"));
        assert_eq!(hub.unregister(a).as_deref(), Some("new"));
    }

    #[test]
    fn second_tab_bound_before_the_first_closes_keeps_the_identity() {
        let hub = ClientHub::new(8);
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        let a = hub.register(tx_a);
        let b = hub.register(tx_b);
        hub.bind(a, "player-1");

        // Tab B binds ahead of its join round-trip, then tab A closes.
        assert_eq!(hub.bind(b, "player-1"), None);
        assert_eq!(hub.unregister(a), None);
        assert!(hub.is_bound("player-1"));
    }

    #[test]
    fn restore_undoes_a_refused_bind() {
        let hub = ClientHub::new(8);
        let (tx, _rx) = mpsc::unbounded_channel();
        let a = hub.register(tx);
        hub.bind(a, "old");

        let previous = hub.session_of(a);
        hub.bind(a, "new");
        hub.restore(a, previous);

        assert_eq!(hub.session_of(a).as_deref(), Some("old"));
        assert!(!hub.is_bound("new"));
    }
}
