use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{ContentItemEntity, ContentType},
    dto::format_system_time,
};

/// Content item as seen by the display and the REST API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: Uuid,
    pub title: String,
    /// `text` or `image`.
    pub content_type: String,
    pub text_content: String,
    pub image_url: Option<String>,
    pub background_color: String,
    pub text_color: String,
    pub font_size: u32,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ContentItemEntity> for ContentItem {
    fn from(entity: ContentItemEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            content_type: content_type_name(entity.content_type).into(),
            text_content: entity.text_content,
            image_url: entity.image_url,
            background_color: entity.background_color,
            text_color: entity.text_color,
            font_size: entity.font_size,
            is_active: entity.is_active,
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}

/// REST view of the active item; `content` is `null` when nothing is active.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActiveContent {
    /// Item on the display, if any.
    pub content: Option<ContentItem>,
}

impl From<Option<ContentItemEntity>> for ActiveContent {
    fn from(value: Option<ContentItemEntity>) -> Self {
        Self {
            content: value.map(ContentItem::from),
        }
    }
}

/// `content_update` payload pushed to clients, keyed in snake_case like the
/// display pages expect. Only sent when an item is active.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContentUpdate {
    pub id: Uuid,
    pub title: String,
    /// `text` or `image`.
    pub content_type: String,
    pub text_content: String,
    pub image_url: Option<String>,
    pub background_color: String,
    pub text_color: String,
    pub font_size: u32,
}

impl From<ContentItemEntity> for ContentUpdate {
    fn from(entity: ContentItemEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            content_type: content_type_name(entity.content_type).into(),
            text_content: entity.text_content,
            image_url: entity.image_url,
            background_color: entity.background_color,
            text_color: entity.text_color,
            font_size: entity.font_size,
        }
    }
}

fn content_type_name(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Text => "text",
        ContentType::Image => "image",
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use serde_json::{Value, json};

    use super::*;
    use crate::dto::ws::ServerMessage;

    fn entity() -> ContentItemEntity {
        ContentItemEntity {
            id: Uuid::nil(),
            title: "Map".into(),
            content_type: ContentType::Image,
            text_content: "Where are we?".into(),
            image_url: Some("/uploads/map.png".into()),
            background_color: "#000000".into(),
            text_color: "#ffffff".into(),
            font_size: 32,
            is_active: true,
            created_at: SystemTime::UNIX_EPOCH,
            updated_at: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn content_update_frame_is_a_flat_snake_case_item() {
        let message = ServerMessage::ContentUpdate(ContentUpdate::from(entity()));
        let frame: Value = serde_json::from_str(&message.to_frame().unwrap()).unwrap();
        assert_eq!(
            frame,
            json!({
                "event": "content_update",
                "data": {
                    "id": "00000000-0000-0000-0000-000000000000",
                    "title": "Map",
                    "content_type": "image",
                    "text_content": "Where are we?",
                    "image_url": "/uploads/map.png",
                    "background_color": "#000000",
                    "text_color": "#ffffff",
                    "font_size": 32
                }
            })
        );
    }

    #[test]
    fn rest_view_wraps_the_item_in_camel_case() {
        let value = serde_json::to_value(ActiveContent::from(Some(entity()))).unwrap();
        assert_eq!(value["content"]["contentType"], "image");
        assert_eq!(value["content"]["isActive"], true);

        let empty = serde_json::to_value(ActiveContent::from(None)).unwrap();
        assert_eq!(empty, json!({ "content": null }));
    }
}
