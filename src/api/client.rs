use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, instrument};

use super::{Issue, IssueKey, SearchRequest, SearchResponse};
use crate::error::{Error, Result};

/// The tracker's search endpoint.
pub const SEARCH_URL: &str = "https://bugs.mojang.com/api/jql-search-post";

/// Client for the search endpoint. Requests are not retried.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: Client,
    endpoint: String,
}

impl Default for SearchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchClient {
    pub fn new() -> Self {
        Self::with_endpoint(SEARCH_URL)
    }

    /// Point the client at another endpoint speaking the same protocol.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one search.
    #[instrument(skip(self, request), fields(project = %request.project, start_at = request.start_at))]
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        debug!(search = %request.search, "searching");
        let response = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }

        let result: SearchResponse = response.json().await?;
        debug!(total = result.total, returned = result.issues.len(), "search finished");
        Ok(result)
    }

    /// Fetch a single issue by key.
    pub async fn issue(&self, key: &str) -> Result<Issue> {
        let key = IssueKey::parse(key)?;
        let request = SearchRequest::jql(key.project, format!("key = {key}"), 0, 1);
        self.search(&request)
            .await?
            .issues
            .into_iter()
            .next()
            .ok_or_else(|| Error::IssueNotFound(key.to_string()))
    }
}
