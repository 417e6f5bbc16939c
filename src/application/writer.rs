// Partitioned writer lands a result set as one NDJSON object per (entity, run date).
//
// Responsibilities
// - Encode the records one per line, order preserved.
// - Write to the deterministic partition key, retrying under the write policy.

use crate::application::errors::ExtractError;
use crate::core::ndjson;
use crate::core::partition::{Entity, PartitionKey};
use crate::core::ports::{BlobStore, BlobStoreError, Record};
use crate::core::retry::{RetryPolicy, retry};
use chrono::NaiveDate;
use std::sync::Arc;

pub struct PartitionedWriter<TBlobs>
where
    TBlobs: BlobStore + 'static,
{
    blobs: Arc<TBlobs>,
    policy: RetryPolicy,
}

impl<TBlobs> PartitionedWriter<TBlobs>
where
    TBlobs: BlobStore + 'static,
{
    pub fn new(blobs: Arc<TBlobs>, policy: RetryPolicy) -> Self {
        Self { blobs, policy }
    }

    pub async fn write(
        &self,
        entity: Entity,
        records: &[Record],
        run_date: NaiveDate,
    ) -> Result<PartitionKey, ExtractError> {
        let partition = PartitionKey::for_run(entity, run_date);
        let key = partition.object_key();
        let body = ndjson::encode(records)
            .map_err(|e| ExtractError::write(&key, BlobStoreError::Encoding(e.to_string())))?;

        let operation = format!("write {key}");
        retry(&self.policy, &operation, || {
            self.blobs.write(&key, body.clone(), ndjson::CONTENT_TYPE)
        })
        .await
        .map_err(|cause| ExtractError::write(&key, cause))?;

        tracing::info!(entity = %entity, key = %key, records = records.len(), "partition written");
        Ok(partition)
    }
}
