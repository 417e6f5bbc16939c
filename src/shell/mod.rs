// Composition root for the extractor.
//
// Responsibilities
// - Read config from environment.
// - Instantiate the HTTP page source and the object store.
// - Wire them into the orchestrator and run it once.

pub mod config;

use crate::adapters::http::rawg_page_source::RawgPageSource;
use crate::adapters::storage::object_store_blob_store::ObjectStoreBlobStore;
use crate::application::checkpoint::BlobCheckpointStore;
use crate::application::fetcher::PaginatedFetcher;
use crate::application::orchestrator::{ExtractionOrchestrator, RunReport};
use anyhow::Context;
use chrono::NaiveDate;
use config::{Config, Destination};
use std::sync::Arc;

pub type RawgOrchestrator =
    ExtractionOrchestrator<RawgPageSource, ObjectStoreBlobStore, BlobCheckpointStore<ObjectStoreBlobStore>>;

pub fn build(config: &Config) -> anyhow::Result<RawgOrchestrator> {
    let source = RawgPageSource::new(config.http_timeout).context("building the HTTP client")?;
    let blobs = match &config.destination {
        Destination::Gcs { bucket } => ObjectStoreBlobStore::gcs(bucket)
            .with_context(|| format!("opening bucket {bucket}"))?,
        Destination::Local { root } => ObjectStoreBlobStore::local(root)
            .with_context(|| format!("opening local root {}", root.display()))?,
    };
    let blobs = Arc::new(blobs);
    let checkpoint = Arc::new(BlobCheckpointStore::new(blobs.clone(), config.checkpoint_key.clone()));
    let fetcher = PaginatedFetcher::new(
        Arc::new(source),
        config.base_url.clone(),
        config.api_key.clone(),
        config.page_size,
    );
    Ok(ExtractionOrchestrator::new(fetcher, blobs, checkpoint, config.retry))
}

pub async fn run(config: &Config, run_date: NaiveDate) -> anyhow::Result<RunReport> {
    tracing::info!(?config, %run_date, "starting extraction");
    let orchestrator = build(config)?;
    let report = orchestrator.run(run_date).await?;
    Ok(report)
}
