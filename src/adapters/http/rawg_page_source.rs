// reqwest implementation of the PageSource port against the RAWG REST API.
//
// Responsibilities
// - Issue GET requests with the given query appended.
// - Map non-success statuses, transport errors and undecodable bodies to SourceError.

use crate::core::ports::{Page, PageSource, SourceError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct RawgPageSource {
    client: Client,
}

impl RawgPageSource {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for RawgPageSource {
    async fn get_page(&self, url: &str, query: &[(String, String)]) -> Result<Page, SourceError> {
        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        // Error texts must not echo the URL: it carries the API key.
        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        response
            .json::<Page>()
            .await
            .map_err(|e| SourceError::Decode(e.without_url().to_string()))
    }
}
