//! Top-k passage retrieval over the Quran and Hadith corpora.

use crate::corpus::{Corpus, CorpusPassages, RetrievedPassage};
use crate::embeddings::EmbeddingProvider;
use crate::lancedb_store::LanceDbStore;
use crate::store::VectorStore;
use baseera_core::{AppConfig, AppResult};
use std::sync::Arc;
use tracing::instrument;

/// Embeds a query and searches one store per corpus.
pub struct KnowledgeRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    quran: Arc<dyn VectorStore>,
    hadith: Arc<dyn VectorStore>,
    top_k: usize,
}

impl KnowledgeRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        quran: Arc<dyn VectorStore>,
        hadith: Arc<dyn VectorStore>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            quran,
            hadith,
            top_k,
        }
    }

    /// Open both corpus tables from the configured index.
    ///
    /// # Errors
    /// `AppError::Unavailable` when either table is missing.
    pub async fn connect(config: &AppConfig, embedder: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        let index_path = config.index_path();
        let dim = embedder.dimensions();

        let quran = LanceDbStore::open(&index_path, Corpus::Quran.table_name(&config.knowledge), dim).await?;
        let hadith = LanceDbStore::open(&index_path, Corpus::Hadith.table_name(&config.knowledge), dim).await?;

        tracing::info!(index = ?index_path, top_k = config.knowledge.top_k, "Knowledge retriever ready");

        Ok(Self::new(
            embedder,
            Arc::new(quran),
            Arc::new(hadith),
            config.knowledge.top_k,
        ))
    }

    fn store(&self, corpus: Corpus) -> &Arc<dyn VectorStore> {
        match corpus {
            Corpus::Quran => &self.quran,
            Corpus::Hadith => &self.hadith,
        }
    }

    /// Top-k passages from one corpus, highest score first.
    #[instrument(skip(self), fields(corpus = %corpus))]
    pub async fn retrieve(&self, query: &str, corpus: Corpus) -> AppResult<Vec<RetrievedPassage>> {
        let embedding = self.embedder.embed(query).await?;
        self.search(&embedding, corpus).await
    }

    /// Top-k passages from both corpora; the query is embedded once and the
    /// corpora are searched one after the other.
    #[instrument(skip(self))]
    pub async fn retrieve_all(&self, query: &str) -> AppResult<CorpusPassages> {
        let embedding = self.embedder.embed(query).await?;
        let quran = self.search(&embedding, Corpus::Quran).await?;
        let hadith = self.search(&embedding, Corpus::Hadith).await?;

        tracing::debug!(quran = quran.len(), hadith = hadith.len(), "Retrieved passages");
        Ok(CorpusPassages { quran, hadith })
    }

    async fn search(&self, embedding: &[f32], corpus: Corpus) -> AppResult<Vec<RetrievedPassage>> {
        let mut hits = self.store(corpus).search(embedding, self.top_k).await?;
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(self.top_k);

        Ok(hits
            .into_iter()
            .map(|hit| RetrievedPassage {
                content: hit.text,
                corpus,
                score: hit.score,
            })
            .collect())
    }
}
