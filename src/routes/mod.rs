use axum::Router;

use crate::state::SharedState;

pub mod content;
pub mod docs;
pub mod health;
pub mod sse;
pub mod stats;
pub mod trivia;
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(websocket::router())
        .merge(trivia::router())
        .merge(content::router())
        .merge(stats::router())
        .merge(docs::router());

    api_router.with_state(state)
}
