use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the game hub.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::display_stream,
        crate::routes::websocket::ws_handler,
        crate::routes::trivia::game_state,
        crate::routes::trivia::start_game,
        crate::routes::trivia::reset_game,
        crate::routes::content::list_content,
        crate::routes::content::active_content,
        crate::routes::content::activate_content,
        crate::routes::stats::device_stats,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::phase::VisiblePhase,
            crate::dto::trivia::GameStateSnapshot,
            crate::dto::trivia::QuestionSnapshot,
            crate::dto::trivia::PlayerSnapshot,
            crate::dto::trivia::EliminateWrongAnswer,
            crate::dto::trivia::QuestionResults,
            crate::dto::trivia::PlayerResult,
            crate::dto::trivia::LeaderboardEntry,
            crate::dto::trivia::ShowLeaderboard,
            crate::dto::trivia::GameFinished,
            crate::dto::content::ContentItem,
            crate::dto::content::ActiveContent,
            crate::dto::content::ContentUpdate,
            crate::dto::stats::StatsResponse,
            crate::dto::ws::JoinRequest,
            crate::dto::ws::SubmitAnswerRequest,
            crate::dto::ws::RenameRequest,
            crate::dto::ws::HeartbeatRequest,
            crate::dto::ws::JoinAck,
            crate::dto::ws::AnswerAck,
            crate::dto::ws::RenameAck,
            crate::dto::ws::CommandAck,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "trivia", description = "Trivia game control and WebSocket protocol"),
        (name = "content", description = "Content shown on the shared display"),
        (name = "stats", description = "Connected device counters"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        for expected in [
            "/healthcheck",
            "/sse/display",
            "/ws",
            "/api/trivia/state",
            "/api/trivia/start",
            "/api/trivia/reset",
            "/api/content",
            "/api/content/active",
            "/api/content/{id}/activate",
            "/api/stats",
        ] {
            assert!(paths.iter().any(|path| path == expected), "missing {expected}");
        }
    }
}
