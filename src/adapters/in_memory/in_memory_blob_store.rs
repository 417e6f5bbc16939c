// In memory implementation of the BlobStore port.
//
// Purpose
// - Exercise the writer, the checkpoint store and full runs without a bucket.
//
// Responsibilities
// - Store blobs and their content types in a map keyed by object key.
// - Record every successful write in order.
// - Inject failures: offline backend, transient write failures, failing key prefixes.

use crate::core::ports::{BlobStore, BlobStoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub body: String,
    pub content_type: String,
}

#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, StoredBlob>>,
    writes: RwLock<Vec<String>>,
    failing_prefixes: RwLock<Vec<String>>,
    transient_write_failures: AtomicU32,
    is_offline: bool,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    /// The next `count` writes fail regardless of key.
    pub fn fail_next_writes(&self, count: u32) {
        self.transient_write_failures.store(count, Ordering::SeqCst);
    }

    /// Every write to a key starting with `prefix` fails.
    pub async fn fail_writes_under(&self, prefix: impl Into<String>) {
        self.failing_prefixes.write().await.push(prefix.into());
    }

    pub async fn get(&self, key: &str) -> Option<StoredBlob> {
        self.blobs.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.blobs.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Keys of successful writes, oldest first.
    pub async fn write_log(&self) -> Vec<String> {
        self.writes.read().await.clone()
    }

    pub async fn seed(&self, key: impl Into<String>, body: impl Into<String>, content_type: &str) {
        self.blobs.write().await.insert(
            key.into(),
            StoredBlob {
                body: body.into(),
                content_type: content_type.to_string(),
            },
        );
    }

    fn offline() -> BlobStoreError {
        BlobStoreError::Backend("Blob store offline".into())
    }
}

#[async_trait::async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn exists(&self, key: &str) -> Result<bool, BlobStoreError> {
        if self.is_offline {
            return Err(Self::offline());
        }
        Ok(self.blobs.read().await.contains_key(key))
    }

    async fn read(&self, key: &str) -> Result<String, BlobStoreError> {
        if self.is_offline {
            return Err(Self::offline());
        }
        self.blobs
            .read()
            .await
            .get(key)
            .map(|blob| blob.body.clone())
            .ok_or_else(|| BlobStoreError::NotFound(key.to_string()))
    }

    async fn write(&self, key: &str, body: String, content_type: &str) -> Result<(), BlobStoreError> {
        if self.is_offline {
            return Err(Self::offline());
        }
        if self
            .transient_write_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(BlobStoreError::Backend(format!("transient failure writing {key}")));
        }
        if self
            .failing_prefixes
            .read()
            .await
            .iter()
            .any(|prefix| key.starts_with(prefix.as_str()))
        {
            return Err(BlobStoreError::Backend(format!("write rejected for {key}")));
        }

        self.blobs.write().await.insert(
            key.to_string(),
            StoredBlob {
                body,
                content_type: content_type.to_string(),
            },
        );
        self.writes.write().await.push(key.to_string());
        Ok(())
    }
}
