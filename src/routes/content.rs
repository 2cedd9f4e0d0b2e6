use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::content::{ActiveContent, ContentItem},
    error::AppError,
    services::content_service,
    state::SharedState,
};

/// Routes over the content shown on the shared display.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/content", get(list_content))
        .route("/api/content/active", get(active_content))
        .route("/api/content/{id}/activate", post(activate_content))
}

/// List every content item, most recent first.
#[utoipa::path(
    get,
    path = "/api/content",
    tag = "content",
    responses(
        (status = 200, description = "Content items", body = [ContentItem])
    )
)]
pub async fn list_content(
    State(state): State<SharedState>,
) -> Result<Json<Vec<ContentItem>>, AppError> {
    Ok(Json(content_service::list(&state).await?))
}

/// Item currently on the display.
#[utoipa::path(
    get,
    path = "/api/content/active",
    tag = "content",
    responses(
        (status = 200, description = "Active item, `content` is null when none", body = ActiveContent)
    )
)]
pub async fn active_content(
    State(state): State<SharedState>,
) -> Result<Json<ActiveContent>, AppError> {
    Ok(Json(content_service::active(&state).await?))
}

/// Make an item the only active one and push it to every client.
#[utoipa::path(
    post,
    path = "/api/content/{id}/activate",
    tag = "content",
    params(("id" = String, Path, description = "Identifier of the content item")),
    responses(
        (status = 200, description = "Item activated", body = ContentItem),
        (status = 404, description = "Unknown item")
    )
)]
pub async fn activate_content(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContentItem>, AppError> {
    Ok(Json(content_service::activate(&state, id).await?))
}
