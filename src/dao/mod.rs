/// Content items shown on the shared display.
pub mod content_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for content operations.
pub mod storage;
