//! Tiered web search: routed provider first, the other one on an empty result.

use crate::provider::WebSearchProvider;
use crate::router::SourceRouter;
use crate::searxng::SearxngProvider;
use crate::types::{Provider, Tier, WebSearchOutcome};
use crate::wikipedia::WikipediaProvider;
use baseera_core::config::SearchConfig;
use baseera_core::{AppError, AppResult};
use std::sync::Arc;

/// Router plus one provider per tier.
pub struct TieredWebSearch {
    router: SourceRouter,
    encyclopedia: Arc<dyn WebSearchProvider>,
    general: Arc<dyn WebSearchProvider>,
}

impl TieredWebSearch {
    /// Wire two providers. The encyclopedia provider must report
    /// `Provider::Wikipedia` and the general one `Provider::Searxng`.
    pub fn new(
        encyclopedia: Arc<dyn WebSearchProvider>,
        general: Arc<dyn WebSearchProvider>,
    ) -> AppResult<Self> {
        if encyclopedia.provider() != Provider::Wikipedia || general.provider() != Provider::Searxng
        {
            return Err(AppError::Config(format!(
                "Tiered search expects wikipedia + searxng, got {} + {}",
                encyclopedia.provider(),
                general.provider()
            )));
        }

        Ok(Self {
            router: SourceRouter::new(),
            encyclopedia,
            general,
        })
    }

    /// Build the Wikipedia and SearxNG providers from configuration.
    pub fn from_config(config: &SearchConfig) -> AppResult<Self> {
        Self::new(
            Arc::new(WikipediaProvider::from_config(config)?),
            Arc::new(SearxngProvider::from_config(config)?),
        )
    }

    fn provider_for(&self, provider: Provider) -> &Arc<dyn WebSearchProvider> {
        match provider {
            Provider::Wikipedia => &self.encyclopedia,
            Provider::Searxng => &self.general,
        }
    }

    pub fn classify(&self, query: &str) -> Tier {
        self.router.classify(query)
    }

    /// Route the query, search, and fall back once if nothing came back.
    ///
    /// Each provider is called at most once per request.
    pub async fn search(&self, query: &str) -> WebSearchOutcome {
        let tier = self.router.classify(query);

        let primary = self.provider_for(tier.primary());
        let results = primary.search(query, primary.default_limit()).await;
        if !results.is_empty() {
            tracing::debug!(%tier, provider = %tier.primary(), count = results.len(), "Web search answered by primary");
            return WebSearchOutcome {
                tier,
                provider_used: tier.primary(),
                fell_back: false,
                results,
            };
        }

        tracing::info!(%tier, from = %tier.primary(), to = %tier.fallback(), "Primary web search empty, falling back");

        let fallback = self.provider_for(tier.fallback());
        let results = fallback.search(query, fallback.default_limit()).await;
        WebSearchOutcome {
            tier,
            provider_used: tier.fallback(),
            fell_back: true,
            results,
        }
    }
}
