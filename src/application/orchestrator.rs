// Extraction orchestrator sequences one run as an explicit state machine.
//
// ReadWatermark -> FetchIncremental -> WriteIncremental -> FetchSnapshots
//     -> WriteSnapshots -> AdvanceWatermark -> Done
//
// Any step error ends the run in that state. AdvanceWatermark can only be built from a
// completed WriteSnapshots, which itself needs a completed WriteIncremental, so the
// checkpoint moves only after every partition of the run has landed.
//
// The orchestrator never retries; tasks and the writer own their retry policies.

use crate::application::errors::ExtractError;
use crate::application::fetcher::PaginatedFetcher;
use crate::application::tasks::{fetch_games, fetch_snapshot};
use crate::application::writer::PartitionedWriter;
use crate::core::partition::{Entity, PartitionKey, SNAPSHOT_ENTITIES};
use crate::core::ports::{BlobStore, CheckpointStore, PageSource, Record};
use crate::core::retry::RetryPolicies;
use crate::core::watermark::FetchWindow;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    ReadWatermark,
    FetchIncremental,
    WriteIncremental,
    FetchSnapshots,
    WriteSnapshots,
    AdvanceWatermark,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A run that stopped in `state`. The checkpoint was not advanced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("extraction run failed in {state}: {source}")]
pub struct RunError {
    pub state: RunState,
    #[source]
    pub source: ExtractError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: Uuid,
    pub run_date: NaiveDate,
    pub window: FetchWindow,
    pub partitions: Vec<PartitionKey>,
    pub watermark: NaiveDate,
}

enum Step {
    ReadWatermark,
    FetchIncremental {
        window: FetchWindow,
    },
    WriteIncremental {
        window: FetchWindow,
        games: Vec<Record>,
    },
    FetchSnapshots {
        window: FetchWindow,
        written: Vec<PartitionKey>,
    },
    WriteSnapshots {
        window: FetchWindow,
        written: Vec<PartitionKey>,
        snapshots: Vec<(Entity, Vec<Record>)>,
    },
    AdvanceWatermark {
        window: FetchWindow,
        written: Vec<PartitionKey>,
    },
    Done(RunReport),
}

impl Step {
    fn state(&self) -> RunState {
        match self {
            Step::ReadWatermark => RunState::ReadWatermark,
            Step::FetchIncremental { .. } => RunState::FetchIncremental,
            Step::WriteIncremental { .. } => RunState::WriteIncremental,
            Step::FetchSnapshots { .. } => RunState::FetchSnapshots,
            Step::WriteSnapshots { .. } => RunState::WriteSnapshots,
            Step::AdvanceWatermark { .. } => RunState::AdvanceWatermark,
            Step::Done(_) => RunState::Done,
        }
    }
}

pub struct ExtractionOrchestrator<TSource, TBlobs, TCheckpoint>
where
    TSource: PageSource + 'static,
    TBlobs: BlobStore + 'static,
    TCheckpoint: CheckpointStore + 'static,
{
    fetcher: PaginatedFetcher<TSource>,
    writer: PartitionedWriter<TBlobs>,
    checkpoint: Arc<TCheckpoint>,
    policies: RetryPolicies,
}

impl<TSource, TBlobs, TCheckpoint> ExtractionOrchestrator<TSource, TBlobs, TCheckpoint>
where
    TSource: PageSource + 'static,
    TBlobs: BlobStore + 'static,
    TCheckpoint: CheckpointStore + 'static,
{
    pub fn new(
        fetcher: PaginatedFetcher<TSource>,
        blobs: Arc<TBlobs>,
        checkpoint: Arc<TCheckpoint>,
        policies: RetryPolicies,
    ) -> Self {
        Self {
            fetcher,
            writer: PartitionedWriter::new(blobs, policies.write),
            checkpoint,
            policies,
        }
    }

    /// Run one extraction. `run_date` is the UTC calendar date the run started on; it names
    /// every partition and becomes the next watermark.
    pub async fn run(&self, run_date: NaiveDate) -> Result<RunReport, RunError> {
        let run_id = Uuid::now_v7();
        let span = tracing::info_span!("extract_run", %run_id, %run_date);
        async move {
            let mut step = Step::ReadWatermark;
            loop {
                let state = step.state();
                step = match step {
                    Step::Done(report) => {
                        tracing::info!(
                            partitions = report.partitions.len(),
                            watermark = %report.watermark,
                            "run complete"
                        );
                        return Ok(report);
                    }
                    step => {
                        tracing::debug!(%state, "entering state");
                        self.advance(step, run_id, run_date).await.map_err(|source| {
                            tracing::error!(%state, error = %source, "run failed, watermark left untouched");
                            RunError { state, source }
                        })?
                    }
                };
            }
        }
        .instrument(span)
        .await
    }

    async fn advance(&self, step: Step, run_id: Uuid, run_date: NaiveDate) -> Result<Step, ExtractError> {
        match step {
            Step::ReadWatermark => {
                let watermark = self.checkpoint.read().await?;
                let window = FetchWindow::incremental(watermark, run_date);
                tracing::info!(%watermark, from = %window.from, to = %window.to, "watermark read");
                Ok(Step::FetchIncremental { window })
            }
            Step::FetchIncremental { window } => {
                let games = fetch_games(&self.fetcher, &self.policies.incremental, &window).await?;
                Ok(Step::WriteIncremental { window, games })
            }
            Step::WriteIncremental { window, games } => {
                let partition = self.writer.write(Entity::Games, &games, run_date).await?;
                Ok(Step::FetchSnapshots {
                    window,
                    written: vec![partition],
                })
            }
            Step::FetchSnapshots { window, written } => {
                let mut snapshots = Vec::with_capacity(SNAPSHOT_ENTITIES.len());
                for entity in SNAPSHOT_ENTITIES {
                    let records = fetch_snapshot(&self.fetcher, &self.policies.snapshot, entity).await?;
                    snapshots.push((entity, records));
                }
                Ok(Step::WriteSnapshots {
                    window,
                    written,
                    snapshots,
                })
            }
            Step::WriteSnapshots {
                window,
                mut written,
                snapshots,
            } => {
                for (entity, records) in &snapshots {
                    written.push(self.writer.write(*entity, records, run_date).await?);
                }
                Ok(Step::AdvanceWatermark { window, written })
            }
            Step::AdvanceWatermark { window, written } => {
                // Never move backwards, even if the host clock is behind the last run.
                let watermark = run_date.max(window.from);
                self.checkpoint.write(watermark).await?;
                tracing::info!(%watermark, "watermark advanced");
                Ok(Step::Done(RunReport {
                    run_id,
                    run_date,
                    window,
                    partitions: written,
                    watermark,
                }))
            }
            Step::Done(report) => Ok(Step::Done(report)),
        }
    }
}
