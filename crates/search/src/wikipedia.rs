//! MediaWiki search API provider.

use crate::provider::{http_client, WebSearchProvider};
use crate::text::{strip_html, trim_text};
use crate::types::{NormalizedSearchResult, Provider};
use baseera_core::config::SearchConfig;
use baseera_core::{AppError, AppResult};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Default)]
struct ApiResponse {
    #[serde(default)]
    query: ApiQuery,
}

#[derive(Debug, Deserialize, Default)]
struct ApiQuery {
    #[serde(default)]
    search: Vec<ApiHit>,
}

#[derive(Debug, Deserialize)]
struct ApiHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

/// Wikipedia full-text search for one language edition.
pub struct WikipediaProvider {
    lang: String,
    limit: usize,
    snippet_max_chars: usize,
    client: reqwest::Client,
}

impl WikipediaProvider {
    pub fn new(
        lang: impl Into<String>,
        limit: usize,
        timeout: Duration,
        snippet_max_chars: usize,
    ) -> AppResult<Self> {
        let lang = lang.into();
        if lang.trim().is_empty() {
            return Err(AppError::Config(
                "Wikipedia language cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            lang,
            limit,
            snippet_max_chars,
            client: http_client(timeout)?,
        })
    }

    pub fn from_config(config: &SearchConfig) -> AppResult<Self> {
        Self::new(
            config.wikipedia_lang.clone(),
            config.wikipedia_limit,
            Duration::from_secs(config.wikipedia_timeout_secs),
            config.snippet_max_chars,
        )
    }

    fn api_url(&self) -> String {
        format!("https://{}.wikipedia.org/w/api.php", self.lang)
    }

    fn article_url(&self, title: &str) -> String {
        format!(
            "https://{}.wikipedia.org/wiki/{}",
            self.lang,
            title.replace(' ', "_")
        )
    }

    fn normalize(&self, body: ApiResponse, limit: usize) -> Vec<NormalizedSearchResult> {
        body.query
            .search
            .into_iter()
            .take(limit)
            .map(|hit| NormalizedSearchResult {
                url: self.article_url(&hit.title),
                title: trim_text(&hit.title, self.snippet_max_chars),
                snippet: trim_text(&strip_html(&hit.snippet), self.snippet_max_chars),
                provider: Provider::Wikipedia,
            })
            .collect()
    }

    async fn fetch(&self, query: &str) -> Result<ApiResponse, reqwest::Error> {
        self.client
            .get(self.api_url())
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("utf8", "1"),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<ApiResponse>()
            .await
    }
}

#[async_trait::async_trait]
impl WebSearchProvider for WikipediaProvider {
    fn provider(&self) -> Provider {
        Provider::Wikipedia
    }

    fn default_limit(&self) -> usize {
        self.limit
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<NormalizedSearchResult> {
        tracing::debug!(lang = %self.lang, "Querying Wikipedia");

        match self.fetch(query).await {
            Ok(body) => {
                let results = self.normalize(body, limit);
                tracing::debug!(count = results.len(), "Wikipedia search complete");
                results
            }
            Err(e) => {
                tracing::warn!(error = %e, "Wikipedia search failed");
                Vec::new()
            }
        }
    }
}
