//! Test doubles.

use crate::build::{build_pipeline_with, EvidenceSources};
use crate::descriptor::Topology;
use crate::runner::SynthesisPipeline;
use async_trait::async_trait;
use baseera_core::{AppConfig, AppError, AppResult};
use baseera_knowledge::{HashingProvider, KnowledgeRetriever, ScoredText, VectorStore};
use baseera_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use baseera_search::{NormalizedSearchResult, Provider, TieredWebSearch, WebSearchProvider};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Returns `final_answer` for the synthesis stage and short notes otherwise.
pub struct ScriptedLlm {
    final_answer: Result<String, String>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn answering(final_answer: &str) -> Arc<Self> {
        Arc::new(Self {
            final_answer: Ok(final_answer.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            final_answer: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// User prompt of the call whose system prompt names `role`.
    pub fn prompt_for(&self, role: &str) -> String {
        self.requests()
            .into_iter()
            .find(|r| r.system.as_deref().unwrap_or_default().contains(role))
            .map(|r| r.prompt)
            .unwrap_or_else(|| panic!("no request for role {}", role))
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let is_synthesis = request
            .system
            .as_deref()
            .is_some_and(|s| s.contains("Synthesis Agent"));

        let content = if is_synthesis {
            match &self.final_answer {
                Ok(answer) => answer.clone(),
                Err(message) => return Err(AppError::Llm(message.clone())),
            }
        } else {
            format!("Notes ({} chars of evidence)", request.prompt.len())
        };

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::new(10, 5),
        })
    }
}

pub struct FixedStore {
    name: &'static str,
    rows: Vec<&'static str>,
}

impl FixedStore {
    pub fn new(name: &'static str, rows: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            name,
            rows: rows.to_vec(),
        })
    }
}

#[async_trait]
impl VectorStore for FixedStore {
    fn name(&self) -> &str {
        self.name
    }

    async fn search(&self, _query: &[f32], top_k: usize) -> AppResult<Vec<ScoredText>> {
        Ok(self
            .rows
            .iter()
            .take(top_k)
            .enumerate()
            .map(|(i, text)| ScoredText {
                text: text.to_string(),
                score: 0.9 - i as f32 * 0.1,
            })
            .collect())
    }
}

pub struct CannedProvider {
    provider: Provider,
    results: Vec<NormalizedSearchResult>,
}

impl CannedProvider {
    pub fn new(provider: Provider, hits: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            provider,
            results: hits
                .iter()
                .map(|(title, url)| NormalizedSearchResult {
                    title: title.to_string(),
                    url: url.to_string(),
                    snippet: format!("About {}", title),
                    provider,
                })
                .collect(),
        })
    }

    pub fn empty(provider: Provider) -> Arc<Self> {
        Self::new(provider, &[])
    }
}

#[async_trait]
impl WebSearchProvider for CannedProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn default_limit(&self) -> usize {
        3
    }

    async fn search(&self, _query: &str, limit: usize) -> Vec<NormalizedSearchResult> {
        self.results.iter().take(limit).cloned().collect()
    }
}

/// Config rooted in a fresh workspace so no stage overrides are picked up.
pub fn test_config() -> (AppConfig, TempDir) {
    let workspace = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.workspace = workspace.path().to_path_buf();
    (config, workspace)
}

pub fn evidence(
    quran: &[&'static str],
    hadith: &[&'static str],
    wikipedia: Arc<CannedProvider>,
    searxng: Arc<CannedProvider>,
) -> EvidenceSources {
    let retriever = KnowledgeRetriever::new(
        Arc::new(HashingProvider::new(32)),
        FixedStore::new("quran", quran),
        FixedStore::new("hadith", hadith),
        5,
    );
    let web = TieredWebSearch::new(wikipedia, searxng).unwrap();
    EvidenceSources::new(Arc::new(retriever), Arc::new(web))
}

pub fn yusuf_evidence() -> EvidenceSources {
    evidence(
        &[
            "We relate to you the best of stories in what We have revealed to you of this Qur'an. (12:3)",
            "So patience is most fitting. And Allah is the one sought for help. (12:18)",
        ],
        &["The noble son of the noble son of the noble son of the noble: Yusuf son of Ya'qub son of Ishaq son of Ibrahim. (Bukhari)"],
        CannedProvider::new(
            Provider::Wikipedia,
            &[("Joseph in Islam", "https://en.wikipedia.org/wiki/Joseph_in_Islam")],
        ),
        CannedProvider::new(
            Provider::Searxng,
            &[("The Story of Prophet Yusuf", "https://example.org/yusuf")],
        ),
    )
}

pub fn empty_evidence() -> EvidenceSources {
    evidence(
        &[],
        &[],
        CannedProvider::empty(Provider::Wikipedia),
        CannedProvider::empty(Provider::Searxng),
    )
}

pub fn pipeline(
    llm: Arc<ScriptedLlm>,
    sources: &EvidenceSources,
    topology: Topology,
) -> (SynthesisPipeline, TempDir) {
    let (config, workspace) = test_config();
    let pipeline = build_pipeline_with(&config, llm, sources, topology).unwrap();
    (pipeline, workspace)
}

pub const YUSUF_ANSWER: &str = r#"{
  "status": "ok",
  "language": "en",
  "answer": "Prophet Yusuf was sold by his brothers, imprisoned unjustly, and raised to authority in Egypt, forgiving his family in the end.",
  "chain_of_thought": "Surah Yusuf narrates the story (12:3); his father's patience is named in 12:18; the hadith affirms his lineage.",
  "sources": ["Qur'an 12:3", "Qur'an 12:18", "Sahih al-Bukhari on the lineage of Yusuf"],
  "web_sources": [{"title": "Joseph in Islam", "url": "https://en.wikipedia.org/wiki/Joseph_in_Islam", "snippet": "About Joseph in Islam", "provider": "wikipedia"}],
  "follow_up_questions": ["What lessons does Surah Yusuf teach about patience?", "Who were the brothers of Yusuf?"]
}"#;

pub const INSUFFICIENT_ANSWER: &str = r#"{
  "status": "insufficient_data",
  "language": "en",
  "answer": "I could not find reliable sources that address this question.",
  "chain_of_thought": "No Quranic, Hadith or web evidence matched the query.",
  "sources": [],
  "web_sources": [],
  "follow_up_questions": ["What is the story of Prophet Yusuf (Joseph)?"]
}"#;
