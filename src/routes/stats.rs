use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::stats::StatsResponse, services::device_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "stats",
    responses((status = 200, description = "Known and recently active devices", body = StatsResponse))
)]
/// Report how many devices joined or sent heartbeats.
pub async fn device_stats(State(state): State<SharedState>) -> Json<StatsResponse> {
    Json(device_service::stats(&state))
}

/// Configure the stats routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/api/stats", get(device_stats))
}
