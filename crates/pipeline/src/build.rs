//! Wiring the pipeline and its retrieval backends from configuration.

use crate::context::{assemble, AssembledContext};
use crate::descriptor::{PipelineDescriptor, Topology};
use crate::runner::{GenerationSettings, SynthesisPipeline};
use crate::tool::{KnowledgeSearchTool, WebSearchTool};
use baseera_core::{AppConfig, AppResult};
use baseera_knowledge::{create_provider, KnowledgeRetriever};
use baseera_llm::{create_client, LlmClient};
use baseera_search::TieredWebSearch;
use std::sync::Arc;

/// Retrieval backends shared by the stage tools and the `context` command.
#[derive(Clone)]
pub struct EvidenceSources {
    pub retriever: Arc<KnowledgeRetriever>,
    pub web: Arc<TieredWebSearch>,
}

impl EvidenceSources {
    pub fn new(retriever: Arc<KnowledgeRetriever>, web: Arc<TieredWebSearch>) -> Self {
        Self { retriever, web }
    }

    /// Connect to the knowledge index and build the web providers.
    ///
    /// # Errors
    /// `AppError::Unavailable` when a corpus table has not been ingested.
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        let embedder = create_provider(config)?;
        let retriever = KnowledgeRetriever::connect(config, embedder).await?;
        let web = TieredWebSearch::from_config(&config.search)?;
        Ok(Self::new(Arc::new(retriever), Arc::new(web)))
    }

    /// Everything the model would see for `query`, without any LLM call.
    pub async fn gather(&self, query: &str) -> AppResult<AssembledContext> {
        let passages = self.retriever.retrieve_all(query).await?;
        let web = self.web.search(query).await;
        Ok(assemble(passages, web))
    }
}

/// Assemble a pipeline from an LLM client and evidence sources.
pub fn build_pipeline_with(
    config: &AppConfig,
    llm: Arc<dyn LlmClient>,
    sources: &EvidenceSources,
    topology: Topology,
) -> AppResult<SynthesisPipeline> {
    let descriptor = PipelineDescriptor::for_topology(
        topology,
        &config.workspace,
        Arc::new(KnowledgeSearchTool::new(sources.retriever.clone())),
        Arc::new(WebSearchTool::new(sources.web.clone())),
    )?;

    tracing::info!(
        topology = %topology,
        stages = ?descriptor.stage_ids(),
        provider = llm.provider_name(),
        "Synthesis pipeline built"
    );

    Ok(SynthesisPipeline::new(
        llm,
        config.model.clone(),
        descriptor,
        GenerationSettings {
            temperature: config.pipeline.temperature,
            max_tokens: config.pipeline.max_tokens,
        },
    ))
}

/// Build the configured pipeline: LLM client, knowledge index, web search.
pub async fn build_pipeline(config: &AppConfig) -> AppResult<SynthesisPipeline> {
    let topology = Topology::parse(&config.pipeline.topology)?;
    let llm = create_client(config)?;
    let sources = EvidenceSources::connect(config).await?;
    build_pipeline_with(config, llm, &sources, topology)
}
