//! Ingest command handler.

use baseera_core::{config::AppConfig, AppError, AppResult};
use baseera_knowledge::{create_provider, ingest_file, Corpus};
use clap::Args;
use std::path::PathBuf;

/// Chunk, embed and store a corpus file, replacing the corpus table
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Corpus to (re)build: quran or hadith
    #[arg(long)]
    pub corpus: String,

    /// Passages as plain text (blank-line separated) or JSONL
    #[arg(long)]
    pub file: PathBuf,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let corpus = Corpus::parse(&self.corpus)?;
        tracing::info!(%corpus, file = ?self.file, "Executing ingest command");

        if !self.file.is_file() {
            return Err(AppError::Config(format!(
                "Corpus file not found: {:?}",
                self.file
            )));
        }

        config.ensure_baseera_dir()?;
        let embedder = create_provider(config)?;
        let report = ingest_file(config, embedder, corpus, &self.file).await?;

        if self.json {
            let output = serde_json::to_string_pretty(&report)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", output);
        } else {
            println!("✓ Ingested {} corpus into table '{}'", report.corpus, report.table);
            println!("  Passages: {}", report.passages);
            println!("  Chunks:   {}", report.chunks);
            println!("  Rows:     {}", report.rows);
        }

        Ok(())
    }
}
