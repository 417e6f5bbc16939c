//! Blob store over the `object_store` crate.
//!
//! - Google Cloud Storage bucket for production runs
//! - Local directory for development runs
//! - `object_store::memory::InMemory` for tests

use crate::core::ports::{BlobStore, BlobStoreError};
use async_trait::async_trait;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct ObjectStoreBlobStore {
    store: Arc<dyn ObjectStore>,
    /// Whether the backend persists object attributes such as the content type.
    with_attributes: bool,
}

impl ObjectStoreBlobStore {
    /// Credentials come from the standard `GOOGLE_*` environment variables.
    pub fn gcs(bucket: &str) -> Result<Self, BlobStoreError> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(Self::map_error)?;
        Ok(Self {
            store: Arc::new(store),
            with_attributes: true,
        })
    }

    pub fn local(root: impl AsRef<Path>) -> Result<Self, BlobStoreError> {
        std::fs::create_dir_all(root.as_ref()).map_err(|e| BlobStoreError::Backend(e.to_string()))?;
        let store = LocalFileSystem::new_with_prefix(root).map_err(Self::map_error)?;
        Ok(Self {
            store: Arc::new(store),
            with_attributes: false,
        })
    }

    /// Wrap an existing store (for testing).
    pub fn from_store(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            with_attributes: true,
        }
    }

    fn map_error(err: object_store::Error) -> BlobStoreError {
        match err {
            object_store::Error::NotFound { path, .. } => BlobStoreError::NotFound(path),
            other => BlobStoreError::Backend(other.to_string()),
        }
    }
}

impl std::fmt::Debug for ObjectStoreBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreBlobStore")
            .field("store", &self.store.to_string())
            .finish()
    }
}

#[async_trait]
impl BlobStore for ObjectStoreBlobStore {
    async fn exists(&self, key: &str) -> Result<bool, BlobStoreError> {
        match self.store.head(&ObjectPath::from(key)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    async fn read(&self, key: &str) -> Result<String, BlobStoreError> {
        let result = self
            .store
            .get(&ObjectPath::from(key))
            .await
            .map_err(Self::map_error)?;
        let bytes = result.bytes().await.map_err(Self::map_error)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| BlobStoreError::Encoding(e.to_string()))
    }

    async fn write(&self, key: &str, body: String, content_type: &str) -> Result<(), BlobStoreError> {
        let mut options = PutOptions::default();
        if self.with_attributes {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
            options.attributes = attributes;
        }
        self.store
            .put_opts(&ObjectPath::from(key), PutPayload::from(body), options)
            .await
            .map_err(Self::map_error)?;
        Ok(())
    }
}
