// Entity fetch tasks: one thin wrapper over the fetcher per entity, each retried under its own policy.
//
// - Games are incremental: only records updated inside the fetch window.
// - Genres, platforms, publishers and tags are snapshots: the whole table on every run.

use crate::application::errors::ExtractError;
use crate::application::fetcher::PaginatedFetcher;
use crate::core::partition::{Entity, PartitionKind};
use crate::core::ports::{PageSource, Record};
use crate::core::retry::{RetryPolicy, retry};
use crate::core::watermark::FetchWindow;

/// Query for the incremental games listing, most recently updated first.
pub fn incremental_params(window: &FetchWindow) -> Vec<(String, String)> {
    vec![
        ("updated".to_string(), window.as_query_value()),
        ("ordering".to_string(), "-updated".to_string()),
    ]
}

pub async fn fetch_games<TSource>(
    fetcher: &PaginatedFetcher<TSource>,
    policy: &RetryPolicy,
    window: &FetchWindow,
) -> Result<Vec<Record>, ExtractError>
where
    TSource: PageSource + 'static,
{
    let params = incremental_params(window);
    let records = retry(policy, "fetch games", || {
        fetcher.fetch_all(Entity::Games.endpoint(), &params)
    })
    .await?;
    tracing::info!(
        entity = %Entity::Games,
        from = %window.from,
        to = %window.to,
        records = records.len(),
        "fetched incremental entity"
    );
    Ok(records)
}

pub async fn fetch_snapshot<TSource>(
    fetcher: &PaginatedFetcher<TSource>,
    policy: &RetryPolicy,
    entity: Entity,
) -> Result<Vec<Record>, ExtractError>
where
    TSource: PageSource + 'static,
{
    debug_assert_eq!(entity.partition_kind(), PartitionKind::Snapshot);
    let operation = format!("fetch {entity}");
    let records = retry(policy, &operation, || fetcher.fetch_all(entity.endpoint(), &[])).await?;
    tracing::info!(entity = %entity, records = records.len(), "fetched snapshot entity");
    Ok(records)
}

#[cfg(test)]
mod entity_fetch_tasks_tests {
    use super::*;
    use crate::adapters::in_memory::scripted_page_source::ScriptedPageSource;
    use crate::test_support::fixtures::{date, records};
    use rstest::{fixture, rstest};
    use std::sync::Arc;
    use std::time::Duration;

    const BASE: &str = "http://rawg.test/api";

    type BeforeEachReturn = (Arc<ScriptedPageSource>, PaginatedFetcher<ScriptedPageSource>);

    #[fixture]
    fn before_each() -> BeforeEachReturn {
        let source = Arc::new(ScriptedPageSource::new());
        let fetcher = PaginatedFetcher::new(source.clone(), BASE, "secret", 40);
        (source, fetcher)
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_filter_games_by_the_window_ending_tomorrow(before_each: BeforeEachReturn) {
        let (source, fetcher) = before_each;
        source.serve(format!("{BASE}/games"), records(1..=2), None).await;
        let window = FetchWindow::incremental(date(2024, 1, 1), date(2024, 3, 9));

        let result = fetch_games(&fetcher, &RetryPolicy::none(), &window).await.unwrap();

        assert_eq!(result.len(), 2);
        let request = &source.requests().await[0];
        assert_eq!(request.param("updated"), Some("2024-01-01,2024-03-10"));
        assert_eq!(request.param("ordering"), Some("-updated"));
    }

    #[rstest]
    #[case(Entity::Genres)]
    #[case(Entity::Platforms)]
    #[case(Entity::Publishers)]
    #[case(Entity::Tags)]
    #[tokio::test]
    async fn it_should_fetch_snapshots_without_a_date_filter(
        before_each: BeforeEachReturn,
        #[case] entity: Entity,
    ) {
        let (source, fetcher) = before_each;
        let url = format!("{BASE}/{}", entity.endpoint());
        source.serve(url.clone(), records(1..=3), None).await;

        let result = fetch_snapshot(&fetcher, &RetryPolicy::none(), entity).await.unwrap();

        assert_eq!(result.len(), 3);
        let request = &source.requests().await[0];
        assert_eq!(request.url, url);
        assert_eq!(request.param("updated"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_retry_a_transient_fetch_failure(before_each: BeforeEachReturn) {
        let (source, fetcher) = before_each;
        let url = format!("{BASE}/tags");
        source.serve(url.clone(), records(1..=1), None).await;
        source.fail(url.clone(), 503, 2).await;

        let result = fetch_snapshot(&fetcher, &RetryPolicy::new(3, Duration::ZERO), Entity::Tags).await;

        assert_eq!(result.unwrap().len(), 1);
        assert_eq!(source.requests_to(&url).await, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_once_retries_are_exhausted(before_each: BeforeEachReturn) {
        let (source, fetcher) = before_each;
        let url = format!("{BASE}/games");
        source.fail_always(url.clone(), 500).await;
        let window = FetchWindow::incremental(date(2024, 1, 1), date(2024, 1, 2));

        let result = fetch_games(&fetcher, &RetryPolicy::new(2, Duration::ZERO), &window).await;

        assert_eq!(result.unwrap_err().status(), Some(500));
        assert_eq!(source.requests_to(&url).await, 3);
    }
}
