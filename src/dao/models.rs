use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Kind of content pushed to the shared screen.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Plain text slide.
    #[default]
    Text,
    /// Image with an optional caption.
    Image,
}

/// Content item shown on the display when it is the active one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentItemEntity {
    /// Stable identifier of the item.
    pub id: Uuid,
    /// Title shown above the content.
    pub title: String,
    /// How the display renders the item.
    pub content_type: ContentType,
    /// Text body or caption.
    pub text_content: String,
    /// Image location for [`ContentType::Image`] items.
    pub image_url: Option<String>,
    /// CSS background colour.
    pub background_color: String,
    /// CSS text colour.
    pub text_color: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Whether this is the item currently on screen. At most one item is active.
    pub is_active: bool,
    /// Creation time.
    pub created_at: SystemTime,
    /// Last activation or edit.
    pub updated_at: SystemTime,
}
