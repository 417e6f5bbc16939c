// Checkpoint store backed by a single JSON object in the blob store.
//
// Responsibilities
// - Read the watermark, falling back to the backfill sentinel only when the object is absent.
// - Treat a failed existence probe or an unreadable body as fatal, never as a first run.
// - Overwrite the object unconditionally on write.

use crate::core::ports::{BlobStore, CheckpointError, CheckpointStore};
use crate::core::watermark::{BACKFILL_FROM, CONTENT_TYPE, CheckpointRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

pub const DEFAULT_CHECKPOINT_KEY: &str = "checkpoints/last_successful_run.json";

pub struct BlobCheckpointStore<TBlobs>
where
    TBlobs: BlobStore + 'static,
{
    blobs: Arc<TBlobs>,
    key: String,
}

impl<TBlobs> BlobCheckpointStore<TBlobs>
where
    TBlobs: BlobStore + 'static,
{
    pub fn new(blobs: Arc<TBlobs>, key: impl Into<String>) -> Self {
        Self {
            blobs,
            key: key.into(),
        }
    }
}

#[async_trait]
impl<TBlobs> CheckpointStore for BlobCheckpointStore<TBlobs>
where
    TBlobs: BlobStore + 'static,
{
    async fn read(&self) -> Result<NaiveDate, CheckpointError> {
        if !self.blobs.exists(&self.key).await.map_err(CheckpointError::Read)? {
            tracing::info!(key = %self.key, backfill_from = %BACKFILL_FROM, "no checkpoint yet, backfilling");
            return Ok(BACKFILL_FROM);
        }

        let body = self.blobs.read(&self.key).await.map_err(CheckpointError::Read)?;
        let record: CheckpointRecord =
            serde_json::from_str(&body).map_err(|e| CheckpointError::Corrupt {
                key: self.key.clone(),
                reason: e.to_string(),
            })?;
        Ok(record.last_successful_run)
    }

    async fn write(&self, date: NaiveDate) -> Result<(), CheckpointError> {
        let body = serde_json::to_string(&CheckpointRecord {
            last_successful_run: date,
        })
        .map_err(|e| CheckpointError::Corrupt {
            key: self.key.clone(),
            reason: e.to_string(),
        })?;
        self.blobs
            .write(&self.key, body, CONTENT_TYPE)
            .await
            .map_err(CheckpointError::Write)
    }
}
