use crate::dto::ws::ServerMessage;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE event name.
    pub event: Option<String>,
    /// JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Mirror a WebSocket frame: the event name becomes the SSE event, the payload its data.
    pub fn from_message(message: &ServerMessage) -> serde_json::Result<Self> {
        Ok(Self {
            event: Some(message.event_name().to_string()),
            data: message.payload_json()?,
        })
    }
}
