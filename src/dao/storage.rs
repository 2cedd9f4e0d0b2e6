use std::io;

use thiserror::Error;

/// Result alias for content store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failures of the content store and its seed file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The seed file could not be read.
    #[error("cannot read content seed: {0}")]
    SeedRead(#[from] io::Error),
    /// The seed file is not a JSON array of content items.
    #[error("invalid content seed: {0}")]
    SeedFormat(#[from] serde_json::Error),
}
