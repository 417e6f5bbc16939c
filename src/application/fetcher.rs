// Paginated fetcher walks a cursor-linked endpoint to exhaustion.
//
// Responsibilities
// - Send the base parameters (key, page size, first page) merged with the caller's on the first request.
// - Follow each `next` URL verbatim, with no query of its own.
// - Concatenate the pages in order, or fail the whole fetch on the first bad response.

use crate::application::errors::ExtractError;
use crate::core::ports::{PageSource, Record};
use std::sync::Arc;

pub struct PaginatedFetcher<TSource>
where
    TSource: PageSource + 'static,
{
    source: Arc<TSource>,
    base_url: String,
    api_key: String,
    page_size: u32,
}

impl<TSource> PaginatedFetcher<TSource>
where
    TSource: PageSource + 'static,
{
    pub fn new(
        source: Arc<TSource>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            source,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            page_size,
        }
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Base parameters first; a caller parameter with the same name replaces the base value in place.
    fn first_query(&self, params: &[(String, String)]) -> Vec<(String, String)> {
        let mut query = vec![
            ("key".to_string(), self.api_key.clone()),
            ("page_size".to_string(), self.page_size.to_string()),
            ("page".to_string(), "1".to_string()),
        ];
        for (name, value) in params {
            match query.iter_mut().find(|(existing, _)| existing == name) {
                Some(slot) => slot.1 = value.clone(),
                None => query.push((name.clone(), value.clone())),
            }
        }
        query
    }

    pub async fn fetch_all(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Vec<Record>, ExtractError> {
        let mut results = Vec::new();
        let mut url = self.endpoint_url(endpoint);
        let mut query = self.first_query(params);
        let mut pages = 0usize;

        loop {
            let page = self
                .source
                .get_page(&url, &query)
                .await
                .map_err(|cause| ExtractError::fetch(endpoint, cause))?;
            pages += 1;
            results.extend(page.results);

            match page.next {
                Some(next) => {
                    url = next;
                    query.clear();
                }
                None => break,
            }
        }

        tracing::debug!(endpoint, pages, records = results.len(), "pagination exhausted");
        Ok(results)
    }
}
