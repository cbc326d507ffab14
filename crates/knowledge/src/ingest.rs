//! Corpus ingestion: read passages, chunk, embed in batches, rewrite the table.

use crate::corpus::Corpus;
use crate::embeddings::EmbeddingProvider;
use crate::lancedb_store::{LanceDbStore, PassageRow};
use baseera_core::{AppConfig, AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use text_splitter::{ChunkConfig, TextSplitter};

/// Characters shared between consecutive chunks of one passage.
const CHUNK_OVERLAP: usize = 200;

/// Summary of one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub corpus: Corpus,
    pub table: String,
    pub passages: usize,
    pub chunks: usize,
    pub rows: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonlRecord {
    Text(String),
    Object { text: String },
}

/// Read passages from a file.
///
/// `.jsonl` files hold one passage per line, either a JSON string or an object
/// with a `text` field. Anything else is plain text with passages separated by
/// blank lines.
pub fn read_passages(path: &Path) -> AppResult<Vec<String>> {
    let contents = std::fs::read_to_string(path)?.replace("\r\n", "\n");

    let is_jsonl = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jsonl"))
        .unwrap_or(false);

    let passages: Vec<String> = if is_jsonl {
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                let record: JsonlRecord = serde_json::from_str(line).map_err(|e| {
                    AppError::Serialization(format!("{:?} line {}: {}", path, i + 1, e))
                })?;
                Ok(match record {
                    JsonlRecord::Text(text) | JsonlRecord::Object { text } => text,
                })
            })
            .collect::<AppResult<Vec<_>>>()?
    } else {
        contents
            .split("\n\n")
            .map(|p| p.to_string())
            .collect()
    };

    Ok(passages
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect())
}

/// Split passages into chunks of at most `chunk_size` characters.
pub fn chunk_passages(passages: &[String], chunk_size: usize) -> AppResult<Vec<String>> {
    if chunk_size == 0 {
        return Err(AppError::Config("Chunk size must be positive".to_string()));
    }

    let overlap = CHUNK_OVERLAP.min(chunk_size / 5);
    let config = ChunkConfig::new(chunk_size)
        .with_overlap(overlap)
        .map_err(|e| AppError::Config(format!("Invalid chunk configuration: {}", e)))?;
    let splitter = TextSplitter::new(config);

    let chunks: Vec<String> = passages
        .iter()
        .flat_map(|passage| splitter.chunks(passage).map(str::to_string).collect::<Vec<_>>())
        .filter(|chunk| !chunk.trim().is_empty())
        .collect();

    tracing::debug!(
        passages = passages.len(),
        chunks = chunks.len(),
        "Split passages into chunks"
    );
    Ok(chunks)
}

/// Ingest a file into one corpus table, replacing its previous contents.
pub async fn ingest_file(
    config: &AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    corpus: Corpus,
    path: &Path,
) -> AppResult<IngestReport> {
    let table = corpus.table_name(&config.knowledge).to_string();
    tracing::info!(%corpus, table = %table, file = ?path, "Starting ingestion");

    let passages = read_passages(path)?;
    if passages.is_empty() {
        return Err(AppError::Knowledge(format!("No passages found in {:?}", path)));
    }

    let chunks = chunk_passages(&passages, config.knowledge.chunk_size)?;
    let batch_size = config.knowledge.batch_size.max(1);
    let total_batches = chunks.len().div_ceil(batch_size);

    let mut rows = Vec::with_capacity(chunks.len());
    for (batch_idx, batch) in chunks.chunks(batch_size).enumerate() {
        let vectors = embedder.embed_batch(batch).await?;
        if vectors.len() != batch.len() {
            return Err(AppError::Knowledge(format!(
                "Embedding provider returned {} vectors for {} chunks",
                vectors.len(),
                batch.len()
            )));
        }

        rows.extend(batch.iter().zip(vectors).map(|(text, vector)| PassageRow {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.clone(),
            vector,
        }));

        tracing::info!(
            "Embedded batch {}/{} ({} chunks)",
            batch_idx + 1,
            total_batches,
            batch.len()
        );
    }

    let written = LanceDbStore::replace(&config.index_path(), &table, embedder.dimensions(), &rows).await?;

    Ok(IngestReport {
        corpus,
        table,
        passages: passages.len(),
        chunks: chunks.len(),
        rows: written,
    })
}
