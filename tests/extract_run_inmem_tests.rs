// End to end in memory tests for a full extraction run.
//
// Responsibilities
// - Drive the orchestrator over the scripted page source and the in memory blob store.
// - Assert what lands in storage and what the checkpoint holds afterwards.

use chrono::NaiveDate;
use rawg_bronze::adapters::in_memory::in_memory_blob_store::InMemoryBlobStore;
use rawg_bronze::adapters::in_memory::scripted_page_source::ScriptedPageSource;
use rawg_bronze::application::checkpoint::BlobCheckpointStore;
use rawg_bronze::application::fetcher::PaginatedFetcher;
use rawg_bronze::application::orchestrator::{ExtractionOrchestrator, RunState};
use rawg_bronze::core::partition::SNAPSHOT_ENTITIES;
use rawg_bronze::core::ports::{CheckpointStore, Record};
use rawg_bronze::core::retry::{RetryPolicies, RetryPolicy};
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const BASE: &str = "https://rawg.test/api";
const CHECKPOINT: &str = "checkpoints/last_successful_run.json";

struct Harness {
    source: Arc<ScriptedPageSource>,
    blobs: Arc<InMemoryBlobStore>,
    checkpoint: Arc<BlobCheckpointStore<InMemoryBlobStore>>,
}

impl Harness {
    fn orchestrator(
        &self,
        policy: RetryPolicy,
    ) -> ExtractionOrchestrator<ScriptedPageSource, InMemoryBlobStore, BlobCheckpointStore<InMemoryBlobStore>> {
        let fetcher = PaginatedFetcher::new(self.source.clone(), BASE, "secret", 3);
        ExtractionOrchestrator::new(
            fetcher,
            self.blobs.clone(),
            self.checkpoint.clone(),
            RetryPolicies::uniform(policy),
        )
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn game(id: i64, name: &str) -> Record {
    match json!({"id": id, "name": name, "updated": "2024-03-08T10:00:00"}) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[fixture]
fn before_each() -> Harness {
    let source = Arc::new(ScriptedPageSource::new());
    let blobs = Arc::new(InMemoryBlobStore::new());
    let checkpoint = Arc::new(BlobCheckpointStore::new(blobs.clone(), CHECKPOINT));
    Harness {
        source,
        blobs,
        checkpoint,
    }
}

async fn serve_games_and_lookups(source: &ScriptedPageSource) {
    source
        .serve_chain(
            &format!("{BASE}/games"),
            vec![
                vec![game(1, "Portal"), game(2, "Braid"), game(3, "Limbo")],
                vec![game(4, "Fez"), game(5, "Celeste")],
            ],
        )
        .await;
    for entity in SNAPSHOT_ENTITIES {
        source
            .serve(format!("{BASE}/{}", entity.endpoint()), vec![game(1, entity.name())], None)
            .await;
    }
}

#[rstest]
#[tokio::test]
async fn first_run_lands_two_pages_of_games_and_sets_the_checkpoint(before_each: Harness) {
    let harness = before_each;
    serve_games_and_lookups(&harness.source).await;
    let today = date(2024, 3, 9);

    harness
        .orchestrator(RetryPolicy::none())
        .run(today)
        .await
        .expect("run failed");

    let games = harness
        .blobs
        .get("games/updated_date=2024-03-09/games.ndjson")
        .await
        .expect("games partition missing");
    let names: Vec<String> = games
        .body
        .lines()
        .map(|line| {
            let record: Record = serde_json::from_str(line).unwrap();
            record["name"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(names, vec!["Portal", "Braid", "Limbo", "Fez", "Celeste"]);
    assert_eq!(harness.checkpoint.read().await, Ok(today));
    assert_eq!(
        harness.blobs.get(CHECKPOINT).await.unwrap().body,
        r#"{"last_successful_run":"2024-03-09"}"#
    );
}

#[rstest]
#[tokio::test]
async fn failed_games_fetch_leaves_the_checkpoint_untouched(before_each: Harness) {
    let harness = before_each;
    serve_games_and_lookups(&harness.source).await;
    harness.checkpoint.write(date(2024, 1, 1)).await.unwrap();
    harness.source.fail_always(format!("{BASE}/games"), 500).await;

    let error = harness
        .orchestrator(RetryPolicy::new(3, Duration::ZERO))
        .run(date(2024, 3, 9))
        .await
        .unwrap_err();

    assert_eq!(error.state, RunState::FetchIncremental);
    assert_eq!(error.source.status(), Some(500));
    assert_eq!(harness.source.requests_to(&format!("{BASE}/games")).await, 4);
    assert_eq!(harness.checkpoint.read().await, Ok(date(2024, 1, 1)));
}

#[rstest]
#[tokio::test]
async fn full_success_overwrites_the_checkpoint_exactly_once_with_the_start_date(before_each: Harness) {
    let harness = before_each;
    serve_games_and_lookups(&harness.source).await;
    harness.checkpoint.write(date(2024, 1, 1)).await.unwrap();
    let writes_before = harness.blobs.write_log().await.len();

    let report = harness
        .orchestrator(RetryPolicy::none())
        .run(date(2024, 3, 9))
        .await
        .unwrap();

    let log = harness.blobs.write_log().await;
    let checkpoint_writes = log[writes_before..]
        .iter()
        .filter(|key| key.as_str() == CHECKPOINT)
        .count();
    assert_eq!(checkpoint_writes, 1);
    assert_eq!(report.watermark, date(2024, 3, 9));
    assert_eq!(
        report
            .partitions
            .iter()
            .map(|p| p.object_key())
            .collect::<Vec<_>>(),
        vec![
            "games/updated_date=2024-03-09/games.ndjson",
            "genres/snapshot_date=2024-03-09/genres.ndjson",
            "platforms/snapshot_date=2024-03-09/platforms.ndjson",
            "publishers/snapshot_date=2024-03-09/publishers.ndjson",
            "tags/snapshot_date=2024-03-09/tags.ndjson",
        ]
    );
}

#[rstest]
#[tokio::test]
async fn runs_on_different_days_write_to_different_keys(before_each: Harness) {
    let harness = before_each;
    serve_games_and_lookups(&harness.source).await;
    let orchestrator = harness.orchestrator(RetryPolicy::none());

    orchestrator.run(date(2024, 3, 9)).await.unwrap();
    let day_one = harness
        .blobs
        .get("tags/snapshot_date=2024-03-09/tags.ndjson")
        .await
        .unwrap();
    harness
        .source
        .serve(format!("{BASE}/tags"), vec![game(9, "changed")], None)
        .await;
    orchestrator.run(date(2024, 3, 10)).await.unwrap();

    assert_eq!(
        harness
            .blobs
            .get("tags/snapshot_date=2024-03-09/tags.ndjson")
            .await
            .unwrap(),
        day_one
    );
    let day_two = harness
        .blobs
        .get("tags/snapshot_date=2024-03-10/tags.ndjson")
        .await
        .unwrap();
    assert!(day_two.body.contains("changed"));
    assert_eq!(harness.checkpoint.read().await, Ok(date(2024, 3, 10)));
}

#[rstest]
#[tokio::test]
async fn a_failed_run_is_repaired_by_the_next_run_over_the_same_window(before_each: Harness) {
    let harness = before_each;
    serve_games_and_lookups(&harness.source).await;
    harness.checkpoint.write(date(2024, 1, 1)).await.unwrap();
    harness.source.fail(format!("{BASE}/publishers"), 503, 1).await;
    let orchestrator = harness.orchestrator(RetryPolicy::none());

    assert!(orchestrator.run(date(2024, 3, 9)).await.is_err());
    let report = orchestrator.run(date(2024, 3, 9)).await.unwrap();

    assert_eq!(report.window.from, date(2024, 1, 1));
    assert_eq!(harness.checkpoint.read().await, Ok(date(2024, 3, 9)));
    let games_requests: Vec<_> = harness
        .source
        .requests()
        .await
        .into_iter()
        .filter(|r| r.url == format!("{BASE}/games"))
        .collect();
    assert_eq!(games_requests.len(), 2);
    assert!(
        games_requests
            .iter()
            .all(|r| r.param("updated") == Some("2024-01-01,2024-03-10"))
    );
}
