use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{trivia::GameStateSnapshot, ws::CommandAck},
    error::AppError,
    services::trivia_service,
    state::SharedState,
};

/// Routes exposing trivia control to hosts without a WebSocket.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/trivia/state", get(game_state))
        .route("/api/trivia/start", post(start_game))
        .route("/api/trivia/reset", post(reset_game))
}

/// Current full trivia snapshot.
#[utoipa::path(
    get,
    path = "/api/trivia/state",
    tag = "trivia",
    responses(
        (status = 200, description = "Current snapshot", body = GameStateSnapshot),
        (status = 503, description = "Trivia engine stopped")
    )
)]
pub async fn game_state(
    State(state): State<SharedState>,
) -> Result<Json<GameStateSnapshot>, AppError> {
    let snapshot = trivia_service::snapshot(&state).await?;
    Ok(Json(snapshot))
}

/// Start a game; rejected starts answer `success: false` with a reason.
#[utoipa::path(
    post,
    path = "/api/trivia/start",
    tag = "trivia",
    responses(
        (status = 200, description = "Start outcome", body = CommandAck)
    )
)]
pub async fn start_game(State(state): State<SharedState>) -> Json<CommandAck> {
    Json(trivia_service::start(&state).await)
}

/// Return to the lobby, keeping players and zeroing scores.
#[utoipa::path(
    post,
    path = "/api/trivia/reset",
    tag = "trivia",
    responses(
        (status = 200, description = "Reset outcome", body = CommandAck)
    )
)]
pub async fn reset_game(State(state): State<SharedState>) -> Json<CommandAck> {
    Json(trivia_service::reset(&state).await)
}
