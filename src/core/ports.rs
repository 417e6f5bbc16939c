// Ports define what the extractor needs from the outside world, without implementing it.
//
// Purpose
// - Describe the paginated catalog API, the blob store and the checkpoint store as traits.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the adapters layer.
//
// Testing guidance
// - The in memory adapters implement every port and can inject failures.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// One schemaless record exactly as the API returned it.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// One page of a cursor-linked listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub results: Vec<Record>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("unexpected status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed page: {0}")]
    Decode(String),
}

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Issue one GET against `url` with `query` appended verbatim.
    async fn get_page(&self, url: &str, query: &[(String, String)]) -> Result<Page, SourceError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlobStoreError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("blob is not valid utf-8: {0}")]
    Encoding(String),

    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, BlobStoreError>;
    async fn read(&self, key: &str) -> Result<String, BlobStoreError>;
    async fn write(&self, key: &str, body: String, content_type: &str) -> Result<(), BlobStoreError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("checkpoint read failed: {0}")]
    Read(BlobStoreError),

    #[error("checkpoint write failed: {0}")]
    Write(BlobStoreError),

    #[error("checkpoint at `{key}` is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Durable single-value store for the watermark.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// The last successful run date, or the backfill sentinel when none was ever written.
    async fn read(&self) -> Result<NaiveDate, CheckpointError>;
    async fn write(&self, date: NaiveDate) -> Result<(), CheckpointError>;
}
