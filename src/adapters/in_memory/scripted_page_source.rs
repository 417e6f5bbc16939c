// Scripted implementation of the PageSource port.
//
// Purpose
// - Stand in for the catalog API in fetcher, task and orchestrator tests.
//
// Responsibilities
// - Serve a fixed page per URL, ignoring the query.
// - Record every request (URL and query) in order.
// - Fail a URL with a status for a number of calls, or for good.

use crate::core::ports::{Page, PageSource, Record, SourceError};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
struct ScriptedFailure {
    status: u16,
    remaining: Option<u32>,
}

#[derive(Default)]
pub struct ScriptedPageSource {
    pages: Mutex<HashMap<String, Page>>,
    failures: Mutex<HashMap<String, ScriptedFailure>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn serve(&self, url: impl Into<String>, results: Vec<Record>, next: Option<&str>) {
        self.pages.lock().await.insert(
            url.into(),
            Page {
                results,
                next: next.map(str::to_string),
            },
        );
    }

    /// Serve `pages` as a cursor-linked chain starting at `first_url`.
    /// Follow-up pages live at `{first_url}?page=N`.
    pub async fn serve_chain(&self, first_url: &str, pages: Vec<Vec<Record>>) {
        let count = pages.len();
        for (index, results) in pages.into_iter().enumerate() {
            let url = Self::chain_url(first_url, index);
            let next = (index + 1 < count).then(|| Self::chain_url(first_url, index + 1));
            self.serve(url, results, next.as_deref()).await;
        }
    }

    pub fn chain_url(first_url: &str, index: usize) -> String {
        if index == 0 {
            first_url.to_string()
        } else {
            format!("{first_url}?page={}", index + 1)
        }
    }

    pub async fn fail(&self, url: impl Into<String>, status: u16, times: u32) {
        self.failures.lock().await.insert(
            url.into(),
            ScriptedFailure {
                status,
                remaining: Some(times),
            },
        );
    }

    pub async fn fail_always(&self, url: impl Into<String>, status: u16) {
        self.failures.lock().await.insert(
            url.into(),
            ScriptedFailure {
                status,
                remaining: None,
            },
        );
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn requests_to(&self, url: &str) -> usize {
        self.requests.lock().await.iter().filter(|r| r.url == url).count()
    }
}

#[async_trait::async_trait]
impl PageSource for ScriptedPageSource {
    async fn get_page(&self, url: &str, query: &[(String, String)]) -> Result<Page, SourceError> {
        self.requests.lock().await.push(RecordedRequest {
            url: url.to_string(),
            query: query.to_vec(),
        });

        if let Some(failure) = self.failures.lock().await.get_mut(url) {
            match failure.remaining {
                None => return Err(SourceError::Status(failure.status)),
                Some(n) if n > 0 => {
                    failure.remaining = Some(n - 1);
                    return Err(SourceError::Status(failure.status));
                }
                Some(_) => {}
            }
        }

        self.pages
            .lock()
            .await
            .get(url)
            .cloned()
            .ok_or(SourceError::Status(404))
    }
}
