use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{
        content::{ActiveContent, ContentItem, ContentUpdate},
        ws::ServerMessage,
    },
    error::ServiceError,
    state::{SharedState, clients::Broadcaster},
};

/// Every content item, most recent first.
pub async fn list(state: &SharedState) -> Result<Vec<ContentItem>, ServiceError> {
    let items = state.content().list_items().await?;
    Ok(items.into_iter().map(ContentItem::from).collect())
}

/// Item currently on the display, for the REST API.
pub async fn active(state: &SharedState) -> Result<ActiveContent, ServiceError> {
    Ok(state.content().active_item().await?.into())
}

/// `content_update` payload for the active item; `None` when nothing is active,
/// in which case nothing is pushed.
pub async fn active_update(state: &SharedState) -> Result<Option<ContentUpdate>, ServiceError> {
    Ok(state.content().active_item().await?.map(ContentUpdate::from))
}

/// Activate `id` and push the new content to every client.
pub async fn activate(state: &SharedState, id: Uuid) -> Result<ContentItem, ServiceError> {
    let activated = state
        .content()
        .activate(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("content `{id}` not found")))?;

    info!(%id, title = %activated.title, "content activated");
    let update = ContentUpdate::from(activated.clone());
    state
        .clients()
        .broadcast_all(&ServerMessage::ContentUpdate(update));
    Ok(activated.into())
}
