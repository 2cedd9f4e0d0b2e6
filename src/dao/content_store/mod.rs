mod memory;

pub use memory::InMemoryContentStore;

use crate::dao::models::ContentItemEntity;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the content persistence layer.
pub trait ContentStore: Send + Sync {
    /// Item currently shown on the display, if any.
    fn active_item(&self) -> BoxFuture<'static, StorageResult<Option<ContentItemEntity>>>;
    /// Every item, most recent first.
    fn list_items(&self) -> BoxFuture<'static, StorageResult<Vec<ContentItemEntity>>>;
    /// Make `id` the only active item. Returns `None` when `id` is unknown, leaving
    /// the current activation untouched.
    fn activate(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ContentItemEntity>>>;
    /// Probe the backing store.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
