//! Object store abstraction layer
//!
//! The upload handler only needs one capability from the storage backend: write a blob of bytes
//! under a key in a bucket. [`ObjectStore`] captures that contract so the handler does not care how
//! transport, authentication or retries are done underneath.
//!
//! A single store is built at startup by [`create_store`] and shared by every request through an
//! `Arc<dyn ObjectStore>`.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::StorageConfig;

pub mod memory;
pub mod s3;

/// Create an object store from configuration
///
/// Adding a new backend requires adding a match arm here.
pub async fn create_store(config: &StorageConfig) -> Arc<dyn ObjectStore> {
    match config {
        StorageConfig::S3(s3_config) => Arc::new(s3::S3ObjectStore::from_config(s3_config).await),
        StorageConfig::Memory => Arc::new(memory::InMemoryObjectStore::new()),
    }
}

/// Result type for object store operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur while writing to the object store
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The store answered and refused the write (permissions, missing bucket, quota, ...)
    #[error("Object store rejected write: {0}")]
    Rejected(String),

    /// The store could not be reached or did not answer in time
    #[error("Object store unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Whether the failure looks transient. Only used for logging; callers never retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Unavailable(_))
    }
}

/// Blob storage addressed by (bucket, key)
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `content` as the object `key` in `bucket`, replacing any existing object.
    async fn write(&self, bucket: &str, key: &str, content: Bytes) -> Result<()>;
}
