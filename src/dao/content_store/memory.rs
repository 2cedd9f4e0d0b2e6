use std::{fs, path::Path, sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::ContentStore;
use crate::dao::{
    models::{ContentItemEntity, ContentType},
    storage::{StorageError, StorageResult},
};

/// Process-local content store. Items are lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryContentStore {
    items: Arc<RwLock<Vec<ContentItemEntity>>>,
}

impl InMemoryContentStore {
    /// Build a store holding `items`. Only the first item flagged active stays active.
    pub fn new(mut items: Vec<ContentItemEntity>) -> Self {
        let mut seen_active = false;
        for item in &mut items {
            if item.is_active && seen_active {
                item.is_active = false;
            }
            seen_active |= item.is_active;
        }
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Store seeded with a single active welcome slide.
    pub fn with_welcome() -> Self {
        let now = SystemTime::now();
        Self::new(vec![ContentItemEntity {
            id: Uuid::new_v4(),
            title: "Welcome to the Game Hub".into(),
            content_type: ContentType::Text,
            text_content: "Scan the QR code to join from your phone.".into(),
            image_url: None,
            background_color: "#1a1a2e".into(),
            text_color: "#ffffff".into(),
            font_size: 32,
            is_active: true,
            created_at: now,
            updated_at: now,
        }])
    }

    /// Parse a seed document: a JSON array of items in camelCase.
    pub fn from_json_str(contents: &str) -> StorageResult<Self> {
        let seeds: Vec<ContentSeed> = serde_json::from_str(contents)?;
        let now = SystemTime::now();
        Ok(Self::new(
            seeds.into_iter().map(|seed| seed.into_entity(now)).collect(),
        ))
    }

    /// Load the seed file at `path`, or fall back to the welcome slide.
    pub fn load_or_welcome(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::with_welcome();
        };

        let loaded = fs::read_to_string(path)
            .map_err(StorageError::from)
            .and_then(|contents| Self::from_json_str(&contents));
        match loaded {
            Ok(store) => {
                info!(path = %path.display(), "loaded content seed");
                store
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to load content seed; using welcome slide");
                Self::with_welcome()
            }
        }
    }
}

impl ContentStore for InMemoryContentStore {
    fn active_item(&self) -> BoxFuture<'static, StorageResult<Option<ContentItemEntity>>> {
        let items = self.items.clone();
        Box::pin(async move {
            let guard = items.read().await;
            Ok(guard.iter().find(|item| item.is_active).cloned())
        })
    }

    fn list_items(&self) -> BoxFuture<'static, StorageResult<Vec<ContentItemEntity>>> {
        let items = self.items.clone();
        Box::pin(async move {
            let guard = items.read().await;
            let mut listed = guard.clone();
            listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(listed)
        })
    }

    fn activate(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ContentItemEntity>>> {
        let items = self.items.clone();
        Box::pin(async move {
            let mut guard = items.write().await;
            if !guard.iter().any(|item| item.id == id) {
                return Ok(None);
            }

            let now = SystemTime::now();
            let mut activated = None;
            for item in guard.iter_mut() {
                item.is_active = item.id == id;
                if item.is_active {
                    item.updated_at = now;
                    activated = Some(item.clone());
                }
            }
            Ok(activated)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// One entry of the content seed file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentSeed {
    #[serde(default)]
    id: Option<Uuid>,
    title: String,
    #[serde(default)]
    content_type: ContentType,
    #[serde(default)]
    text_content: String,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default = "default_background")]
    background_color: String,
    #[serde(default = "default_text_color")]
    text_color: String,
    #[serde(default = "default_font_size")]
    font_size: u32,
    #[serde(default)]
    is_active: bool,
}

fn default_background() -> String {
    "#ffffff".into()
}

fn default_text_color() -> String {
    "#000000".into()
}

fn default_font_size() -> u32 {
    24
}

impl ContentSeed {
    fn into_entity(self, now: SystemTime) -> ContentItemEntity {
        ContentItemEntity {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            title: self.title,
            content_type: self.content_type,
            text_content: self.text_content,
            image_url: self.image_url,
            background_color: self.background_color,
            text_color: self.text_color,
            font_size: self.font_size,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"[
        { "title": "Intro", "textContent": "Hello", "isActive": true },
        { "id": "6f1c3b1e-58a4-4a63-9c41-0f6f3f1f2d10", "title": "Map", "contentType": "image", "imageUrl": "/uploads/map.png" },
        { "title": "Also active", "isActive": true }
    ]"#;

    #[tokio::test]
    async fn seed_keeps_a_single_active_item() {
        let store = InMemoryContentStore::from_json_str(SEED).unwrap();
        let items = store.list_items().await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items.iter().filter(|item| item.is_active).count(), 1);

        let active = store.active_item().await.unwrap().unwrap();
        assert_eq!(active.title, "Intro");
        assert_eq!(active.background_color, "#ffffff");
        assert_eq!(active.font_size, 24);
    }

    #[tokio::test]
    async fn activation_moves_the_active_flag() {
        let store = InMemoryContentStore::from_json_str(SEED).unwrap();
        let id: Uuid = "6f1c3b1e-58a4-4a63-9c41-0f6f3f1f2d10".parse().unwrap();

        let activated = store.activate(id).await.unwrap().unwrap();
        assert_eq!(activated.title, "Map");
        assert_eq!(activated.content_type, ContentType::Image);

        let items = store.list_items().await.unwrap();
        let active: Vec<_> = items.iter().filter(|item| item.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, id);
    }

    #[tokio::test]
    async fn unknown_id_leaves_activation_untouched() {
        let store = InMemoryContentStore::with_welcome();
        assert!(store.activate(Uuid::new_v4()).await.unwrap().is_none());
        let active = store.active_item().await.unwrap().unwrap();
        assert_eq!(active.title, "Welcome to the Game Hub");
    }

    #[test]
    fn malformed_seed_is_an_error() {
        assert!(matches!(
            InMemoryContentStore::from_json_str("{}"),
            Err(StorageError::SeedFormat(_))
        ));
    }

    #[test]
    fn missing_seed_file_falls_back_to_welcome() {
        let store = InMemoryContentStore::load_or_welcome(Some(Path::new("missing/content.json")));
        let items = store.items.try_read().unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_active);
    }
}
