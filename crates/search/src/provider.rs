//! Web search provider trait and shared HTTP setup.

use crate::types::{NormalizedSearchResult, Provider};
use baseera_core::{AppError, AppResult};
use std::time::Duration;

/// User-Agent sent by every provider.
pub fn user_agent() -> String {
    format!("Baseera/{}", env!("CARGO_PKG_VERSION"))
}

/// Build the HTTP client a provider uses.
pub(crate) fn http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent())
        .build()
        .map_err(|e| AppError::Search(format!("Failed to build HTTP client: {}", e)))
}

/// A web search backend.
///
/// `search` never fails: transport, status and decode errors are logged and
/// reported as an empty result list so the caller can fall back.
#[async_trait::async_trait]
pub trait WebSearchProvider: Send + Sync {
    fn provider(&self) -> Provider;

    /// Default number of results for this provider.
    fn default_limit(&self) -> usize;

    /// Search and return at most `limit` normalized results.
    async fn search(&self, query: &str, limit: usize) -> Vec<NormalizedSearchResult>;
}
