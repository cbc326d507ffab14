//! Context command handler.

use baseera_core::{config::AppConfig, AppError, AppResult};
use baseera_pipeline::EvidenceSources;
use clap::Args;

/// Print the Quran, Hadith and web evidence for a question
#[derive(Args, Debug)]
pub struct ContextCommand {
    /// The question, in English or Indonesian
    #[arg(required = true, num_args = 1..)]
    pub topic: Vec<String>,

    /// Output passages and web results as JSON
    #[arg(long)]
    pub json: bool,
}

impl ContextCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let topic = self.topic.join(" ");
        tracing::info!("Executing context command");

        let sources = EvidenceSources::connect(config).await?;
        let context = sources.gather(&topic).await?;

        tracing::info!(
            quran = context.passages.quran.len(),
            hadith = context.passages.hadith.len(),
            web = context.web.results.len(),
            tier = %context.web.tier,
            provider = %context.web.provider_used,
            "Context assembled"
        );

        if self.json {
            let output = serde_json::to_string_pretty(&context)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", output);
        } else {
            println!("{}", context.text);
        }

        Ok(())
    }
}
