//! Tools a stage runs against the query before its LLM call.

use crate::context::{render_scripture, render_web};
use async_trait::async_trait;
use baseera_core::AppResult;
use baseera_knowledge::KnowledgeRetriever;
use baseera_search::TieredWebSearch;
use std::sync::Arc;

/// A retrieval tool invoked with the raw query.
///
/// Output is plain text appended to the stage prompt under the tool's name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Label shown to the model above the tool output
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn invoke(&self, query: &str) -> AppResult<String>;
}

/// Top-k Quran and Hadith passages.
pub struct KnowledgeSearchTool {
    retriever: Arc<KnowledgeRetriever>,
}

impl KnowledgeSearchTool {
    pub fn new(retriever: Arc<KnowledgeRetriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for KnowledgeSearchTool {
    fn name(&self) -> &str {
        "Religious Text Search"
    }

    fn description(&self) -> &str {
        "Searches the Qur'an and Hadith indexes for passages relevant to a query."
    }

    async fn invoke(&self, query: &str) -> AppResult<String> {
        let passages = self.retriever.retrieve_all(query).await?;
        tracing::debug!(
            quran = passages.quran.len(),
            hadith = passages.hadith.len(),
            "Knowledge search complete"
        );
        Ok(render_scripture(&passages))
    }
}

/// Tiered Wikipedia/SearxNG search. Never fails; an empty search renders the
/// no-results marker.
pub struct WebSearchTool {
    search: Arc<TieredWebSearch>,
}

impl WebSearchTool {
    pub fn new(search: Arc<TieredWebSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "Web Search"
    }

    fn description(&self) -> &str {
        "Performs a tiered web search using Wikipedia and SearxNG for contemporary views, articles, and fatwas."
    }

    async fn invoke(&self, query: &str) -> AppResult<String> {
        let outcome = self.search.search(query).await;
        Ok(render_web(&outcome.results))
    }
}
