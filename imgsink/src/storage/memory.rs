//! In-process object store
//!
//! Keeps objects in memory and records every write attempt in order. Useful for local development
//! (`storage.type: memory`) and for asserting exactly which writes the handler issued.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::storage::{ObjectStore, Result, StorageError};

/// A single write attempt, successful or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub bucket: String,
    pub key: String,
    pub content: Bytes,
}

#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: DashMap<(String, String), Bytes>,
    writes: Mutex<Vec<WriteRecord>>,
    fail_writes: bool,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, for exercising error paths
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Current content of an object, if it exists
    pub fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects.get(&(bucket.to_string(), key.to_string())).map(|entry| entry.value().clone())
    }

    /// Every write attempt so far, oldest first
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.writes.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn write(&self, bucket: &str, key: &str, content: Bytes) -> Result<()> {
        self.writes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(WriteRecord {
                bucket: bucket.to_string(),
                key: key.to_string(),
                content: content.clone(),
            });

        if self.fail_writes {
            return Err(StorageError::Unavailable(format!("in-memory store refused write of {bucket}/{key}")));
        }

        // last write wins
        self.objects.insert((bucket.to_string(), key.to_string()), content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_get() {
        let store = InMemoryObjectStore::new();
        store.write("photos", "cat.png", Bytes::from_static(b"\x89PNG")).await.unwrap();

        assert_eq!(store.get("photos", "cat.png"), Some(Bytes::from_static(b"\x89PNG")));
        assert_eq!(store.get("other", "cat.png"), None);
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = InMemoryObjectStore::new();
        store.write("photos", "cat.png", Bytes::from_static(b"first")).await.unwrap();
        store.write("photos", "cat.png", Bytes::from_static(b"second")).await.unwrap();

        assert_eq!(store.get("photos", "cat.png"), Some(Bytes::from_static(b"second")));
        assert_eq!(store.writes().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_store_records_attempt_but_stores_nothing() {
        let store = InMemoryObjectStore::failing();
        let err = store.write("photos", "cat.png", Bytes::from_static(b"data")).await.unwrap_err();

        assert!(err.is_transient());
        assert_eq!(store.get("photos", "cat.png"), None);
        assert_eq!(store.writes().len(), 1);
    }
}
