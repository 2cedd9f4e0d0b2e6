use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Connected WebSocket clients.
    pub connections: usize,
}

impl HealthResponse {
    /// The trivia engine answers requests.
    pub fn ok(connections: usize) -> Self {
        Self {
            status: "ok".to_string(),
            connections,
        }
    }

    /// The trivia engine stopped answering.
    pub fn degraded(connections: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            connections,
        }
    }
}
