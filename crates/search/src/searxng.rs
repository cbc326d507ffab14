//! SearxNG JSON API provider.

use crate::provider::{http_client, WebSearchProvider};
use crate::text::trim_text;
use crate::types::{NormalizedSearchResult, Provider};
use baseera_core::config::SearchConfig;
use baseera_core::AppResult;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    results: Vec<ApiHit>,
}

#[derive(Debug, Deserialize)]
struct ApiHit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Self-hosted SearxNG metasearch.
pub struct SearxngProvider {
    endpoint: String,
    engines: String,
    language: String,
    limit: usize,
    snippet_max_chars: usize,
    client: reqwest::Client,
}

impl SearxngProvider {
    pub fn new(
        endpoint: impl Into<String>,
        engines: impl Into<String>,
        language: impl Into<String>,
        limit: usize,
        timeout: Duration,
        snippet_max_chars: usize,
    ) -> AppResult<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            engines: engines.into(),
            language: language.into(),
            limit,
            snippet_max_chars,
            client: http_client(timeout)?,
        })
    }

    pub fn from_config(config: &SearchConfig) -> AppResult<Self> {
        Self::new(
            config.searxng_endpoint.clone(),
            config.searxng_engines.clone(),
            config.wikipedia_lang.clone(),
            config.searxng_limit,
            Duration::from_secs(config.searxng_timeout_secs),
            config.snippet_max_chars,
        )
    }

    fn normalize(&self, body: ApiResponse, limit: usize) -> Vec<NormalizedSearchResult> {
        body.results
            .into_iter()
            .take(limit)
            .map(|hit| NormalizedSearchResult {
                title: trim_text(hit.title.as_deref().unwrap_or_default(), self.snippet_max_chars),
                url: hit.url.unwrap_or_default(),
                snippet: trim_text(
                    hit.content.as_deref().unwrap_or_default(),
                    self.snippet_max_chars,
                ),
                provider: Provider::Searxng,
            })
            .collect()
    }

    async fn fetch(&self, query: &str) -> Result<ApiResponse, reqwest::Error> {
        // SearxNG reads form-style parameters from the query string on POST too.
        self.client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("q", query),
                ("format", "json"),
                ("engines", self.engines.as_str()),
                ("language", self.language.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<ApiResponse>()
            .await
    }
}

#[async_trait::async_trait]
impl WebSearchProvider for SearxngProvider {
    fn provider(&self) -> Provider {
        Provider::Searxng
    }

    fn default_limit(&self) -> usize {
        self.limit
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<NormalizedSearchResult> {
        tracing::debug!(endpoint = %self.endpoint, "Querying SearxNG");

        match self.fetch(query).await {
            Ok(body) => {
                let results = self.normalize(body, limit);
                tracing::debug!(count = results.len(), "SearxNG search complete");
                results
            }
            Err(e) => {
                tracing::warn!(error = %e, "SearxNG search failed");
                Vec::new()
            }
        }
    }
}
