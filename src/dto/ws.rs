use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::{
    content::ContentUpdate,
    format_system_time,
    trivia::{
        EliminateWrongAnswer, GameFinished, GameStateSnapshot, PlayerSnapshot, QuestionResults,
        ShowLeaderboard,
    },
    validation::validate_session_id,
};
use crate::state::state_machine::AnswerReceipt;

/// Errors raised while decoding an inbound frame.
#[derive(Debug, Error)]
pub enum InboundError {
    /// Not JSON, or a payload of the wrong shape.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Event name the hub does not handle.
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
}

/// `{"event", "data"}` envelope shared by every frame.
#[derive(Debug, Deserialize)]
struct InboundFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Messages accepted from player and display WebSocket clients.
#[derive(Debug)]
pub enum ClientMessage {
    /// `join_trivia_game`: enter the lobby.
    JoinTriviaGame(JoinRequest),
    /// `submit_answer`: store or replace the answer to the current question.
    SubmitAnswer(SubmitAnswerRequest),
    /// `update_player_name`: rename while the lobby is open.
    UpdatePlayerName(RenameRequest),
    /// `start_trivia_game`: host starts the game.
    StartTriviaGame,
    /// `reset_trivia_game`: host returns to the lobby.
    ResetTriviaGame,
    /// `get_game_state`: unicast snapshot request.
    GetGameState,
    /// `get_active_content`: unicast content request.
    GetActiveContent,
    /// `device_heartbeat`: liveness ping feeding the device stats.
    DeviceHeartbeat(HeartbeatRequest),
}

impl ClientMessage {
    /// Decode a text frame. Payload validation is left to the handler so it can
    /// answer with a rejection ack.
    pub fn from_json_str(text: &str) -> Result<Self, InboundError> {
        let frame: InboundFrame = serde_json::from_str(text)?;
        let message = match frame.event.as_str() {
            "join_trivia_game" => Self::JoinTriviaGame(payload(frame.data)?),
            "submit_answer" => Self::SubmitAnswer(payload(frame.data)?),
            "update_player_name" => Self::UpdatePlayerName(payload(frame.data)?),
            "start_trivia_game" => Self::StartTriviaGame,
            "reset_trivia_game" => Self::ResetTriviaGame,
            "get_game_state" => Self::GetGameState,
            "get_active_content" => Self::GetActiveContent,
            "device_heartbeat" => Self::DeviceHeartbeat(payload(frame.data)?),
            other => return Err(InboundError::UnknownEvent(other.to_string())),
        };
        Ok(message)
    }
}

fn payload<T: DeserializeOwned + Default>(data: Value) -> Result<T, serde_json::Error> {
    if data.is_null() {
        Ok(T::default())
    } else {
        serde_json::from_value(data)
    }
}

/// `join_trivia_game` payload.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinRequest {
    /// Browser session identity.
    #[validate(custom(function = "validate_session_id"))]
    pub session_id: String,
    /// Browser user agent, kept as player and device metadata.
    #[validate(length(max = 512, message = "user agent must be at most 512 characters"))]
    pub user_agent: Option<String>,
}

/// `submit_answer` payload.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitAnswerRequest {
    /// Identity of the answering player.
    #[validate(custom(function = "validate_session_id"))]
    pub session_id: String,
    /// Text of the chosen option.
    #[validate(length(max = 512, message = "answer must be at most 512 characters"))]
    pub answer: String,
}

/// `update_player_name` payload.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RenameRequest {
    /// Identity of the player to rename.
    #[validate(custom(function = "validate_session_id"))]
    pub session_id: String,
    /// Requested name, trimmed and truncated by the engine.
    #[validate(length(max = 256, message = "name must be at most 256 characters"))]
    pub new_name: String,
}

/// `device_heartbeat` payload. Display pages send `session_id`, player pages `sessionId`.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct HeartbeatRequest {
    /// Browser session identity of the device.
    #[serde(alias = "session_id")]
    #[validate(custom(function = "validate_session_id"))]
    pub session_id: String,
}

/// `player_joined` reply.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JoinAck {
    /// Whether the player is in the lobby.
    pub success: bool,
    /// The joined player, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerSnapshot>,
    /// Why the join was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl JoinAck {
    /// Successful join.
    pub fn accepted(player: PlayerSnapshot) -> Self {
        Self {
            success: true,
            player: Some(player),
            reason: None,
        }
    }

    /// Refused join.
    pub fn rejected(reason: impl ToString) -> Self {
        Self {
            success: false,
            player: None,
            reason: Some(reason.to_string()),
        }
    }
}

/// `answer_submitted` reply.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnswerAck {
    /// Whether the answer was stored.
    pub success: bool,
    /// Stored answer text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// RFC 3339 submission time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Why the answer was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AnswerAck {
    /// Stored answer.
    pub fn accepted(receipt: AnswerReceipt) -> Self {
        Self {
            success: true,
            answer: Some(receipt.answer),
            timestamp: Some(format_system_time(receipt.answered_at)),
            reason: None,
        }
    }

    /// Refused answer.
    pub fn rejected(reason: impl ToString) -> Self {
        Self {
            success: false,
            answer: None,
            timestamp: None,
            reason: Some(reason.to_string()),
        }
    }
}

/// `name_update_response` reply.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameAck {
    /// Whether the name changed.
    pub success: bool,
    /// Name as stored after trimming and truncation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    /// Why the rename was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RenameAck {
    /// Applied rename.
    pub fn accepted(new_name: String) -> Self {
        Self {
            success: true,
            new_name: Some(new_name),
            reason: None,
        }
    }

    /// Refused rename.
    pub fn rejected(reason: impl ToString) -> Self {
        Self {
            success: false,
            new_name: None,
            reason: Some(reason.to_string()),
        }
    }
}

/// `game_start_response` and `game_reset_response` reply.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommandAck {
    /// Whether the command was applied.
    pub success: bool,
    /// Why the command was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CommandAck {
    /// Applied command.
    pub fn accepted() -> Self {
        Self {
            success: true,
            reason: None,
        }
    }

    /// Refused command.
    pub fn rejected(reason: impl ToString) -> Self {
        Self {
            success: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Every frame the server pushes, serialised as `{"event": <name>, "data": <payload>}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full trivia snapshot.
    GameStateUpdate(Box<GameStateSnapshot>),
    /// A wrong option was removed.
    EliminateWrongAnswer(EliminateWrongAnswer),
    /// The current question resolved.
    QuestionResults(QuestionResults),
    /// Intermediate standings.
    ShowLeaderboard(ShowLeaderboard),
    /// Final standings.
    GameFinished(GameFinished),
    /// Newly active display content.
    ContentUpdate(ContentUpdate),
    /// Reply to `join_trivia_game`.
    PlayerJoined(JoinAck),
    /// Reply to `submit_answer`.
    AnswerSubmitted(AnswerAck),
    /// Reply to `update_player_name`.
    NameUpdateResponse(RenameAck),
    /// Reply to `start_trivia_game`.
    GameStartResponse(CommandAck),
    /// Reply to `reset_trivia_game`.
    GameResetResponse(CommandAck),
}

impl ServerMessage {
    /// Wire name of the event.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::GameStateUpdate(_) => "game_state_update",
            Self::EliminateWrongAnswer(_) => "eliminate_wrong_answer",
            Self::QuestionResults(_) => "question_results",
            Self::ShowLeaderboard(_) => "show_leaderboard",
            Self::GameFinished(_) => "game_finished",
            Self::ContentUpdate(_) => "content_update",
            Self::PlayerJoined(_) => "player_joined",
            Self::AnswerSubmitted(_) => "answer_submitted",
            Self::NameUpdateResponse(_) => "name_update_response",
            Self::GameStartResponse(_) => "game_start_response",
            Self::GameResetResponse(_) => "game_reset_response",
        }
    }

    /// Full `{"event", "data"}` frame.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Payload alone, as carried in the SSE `data` field.
    pub fn payload_json(&self) -> serde_json::Result<String> {
        let mut frame = serde_json::to_value(self)?;
        serde_json::to_string(&frame["data"].take())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_join_with_camel_case_payload() {
        let message = ClientMessage::from_json_str(
            r#"{"event":"join_trivia_game","data":{"sessionId":"s-1","userAgent":"Firefox"}}"#,
        )
        .unwrap();
        let ClientMessage::JoinTriviaGame(request) = message else {
            panic!("expected join");
        };
        assert_eq!(request.session_id, "s-1");
        assert_eq!(request.user_agent.as_deref(), Some("Firefox"));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn commands_without_data_are_accepted() {
        assert!(matches!(
            ClientMessage::from_json_str(r#"{"event":"start_trivia_game"}"#).unwrap(),
            ClientMessage::StartTriviaGame
        ));
        assert!(matches!(
            ClientMessage::from_json_str(r#"{"event":"reset_trivia_game","data":{}}"#).unwrap(),
            ClientMessage::ResetTriviaGame
        ));
    }

    #[test]
    fn missing_payload_decodes_but_fails_validation() {
        let message = ClientMessage::from_json_str(r#"{"event":"submit_answer"}"#).unwrap();
        let ClientMessage::SubmitAnswer(request) = message else {
            panic!("expected submit");
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("session_id"));
    }

    #[test]
    fn unknown_events_and_garbage_are_errors() {
        assert!(matches!(
            ClientMessage::from_json_str(r#"{"event":"launch_rockets"}"#),
            Err(InboundError::UnknownEvent(name)) if name == "launch_rockets"
        ));
        assert!(matches!(
            ClientMessage::from_json_str("not json"),
            Err(InboundError::Malformed(_))
        ));
    }

    #[test]
    fn rename_rejects_oversized_raw_names() {
        let request = RenameRequest {
            session_id: "abc".into(),
            new_name: "x".repeat(257),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("new_name"));
    }

    #[test]
    fn oversized_answers_and_bad_identities_fail_validation() {
        let request = SubmitAnswerRequest {
            session_id: "has space".into(),
            answer: "a".repeat(513),
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("session_id"));
        assert!(fields.contains_key("answer"));

        let request = JoinRequest {
            session_id: "s-1".into(),
            user_agent: Some("u".repeat(513)),
        };
        assert!(request.validate().unwrap_err().field_errors().contains_key("user_agent"));
    }

    #[test]
    fn heartbeat_accepts_both_identity_spellings() {
        for text in [
            r#"{"event":"device_heartbeat","data":{"session_id":"tv-1"}}"#,
            r#"{"event":"device_heartbeat","data":{"sessionId":"tv-1"}}"#,
        ] {
            let ClientMessage::DeviceHeartbeat(request) = ClientMessage::from_json_str(text).unwrap()
            else {
                panic!("expected heartbeat");
            };
            assert_eq!(request.session_id, "tv-1");
            assert!(request.validate().is_ok());
        }
    }

    #[test]
    fn outbound_frames_use_event_and_data_keys() {
        let message = ServerMessage::EliminateWrongAnswer(EliminateWrongAnswer { answer_index: 2 });
        let frame: Value = serde_json::from_str(&message.to_frame().unwrap()).unwrap();
        assert_eq!(
            frame,
            json!({ "event": "eliminate_wrong_answer", "data": { "answerIndex": 2 } })
        );
        assert_eq!(message.event_name(), "eliminate_wrong_answer");
        assert_eq!(message.payload_json().unwrap(), r#"{"answerIndex":2}"#);
    }

    #[test]
    fn rejected_acks_carry_reason_only() {
        let frame = ServerMessage::NameUpdateResponse(RenameAck::rejected("game already started"));
        let value: Value = serde_json::from_str(&frame.to_frame().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "name_update_response",
                "data": { "success": false, "reason": "game already started" }
            })
        );
    }
}
