//! Ask command handler.

use baseera_core::{config::AppConfig, AppError, AppResult};
use baseera_pipeline::{handle_query, AppContext, Disposition, Topology};
use clap::Args;

/// Answer a question and print the envelope as JSON
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question, in English or Indonesian
    #[arg(required = true, num_args = 1..)]
    pub topic: Vec<String>,

    /// Stage layout: full (research, validate, synthesize) or simplified
    #[arg(long)]
    pub topology: Option<String>,

    /// Pretty-print the JSON envelope
    #[arg(long)]
    pub pretty: bool,
}

impl AskCommand {
    pub async fn execute(&self, mut config: AppConfig) -> AppResult<()> {
        if let Some(topology) = &self.topology {
            config.pipeline.topology = Topology::parse(topology)?.as_str().to_string();
        }

        let topic = self.topic.join(" ");
        tracing::info!(topology = %config.pipeline.topology, "Executing ask command");
        tracing::debug!("Topic: {}", topic);

        let context = AppContext::from_config(config);
        let response = handle_query(&context, &topic).await;

        println!("{}", render(&response.envelope, self.pretty)?);
        exit_status(response.disposition, &response.envelope.chain_of_thought)
    }
}

/// Non-answered requests fail the command after the envelope is printed.
fn exit_status(disposition: Disposition, reason: &str) -> AppResult<()> {
    match disposition {
        Disposition::Answered => Ok(()),
        Disposition::Unavailable => Err(AppError::Unavailable(reason.to_string())),
        Disposition::BadRequest | Disposition::Failed => {
            Err(AppError::Pipeline(format!("{:?}: {}", disposition, reason)))
        }
    }
}

fn render<T: serde::Serialize>(value: &T, pretty: bool) -> AppResult<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.map_err(|e| AppError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use baseera_pipeline::AnswerEnvelope;

    #[test]
    fn test_render_compact_and_pretty() {
        let envelope = AnswerEnvelope::empty_query();
        let compact = render(&envelope, false).unwrap();
        let pretty = render(&envelope, true).unwrap();

        assert!(!compact.contains('\n'));
        assert!(pretty.contains("\n  \"status\": \"error\""));
    }

    #[tokio::test]
    async fn test_small_talk_needs_no_backends() {
        let workspace = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.workspace = workspace.path().to_path_buf();

        let command = AskCommand {
            topic: vec!["assalamualaikum".to_string()],
            topology: Some("simplified".to_string()),
            pretty: false,
        };
        assert!(command.execute(config).await.is_ok());
    }

    #[test]
    fn test_exit_status_follows_disposition() {
        assert!(exit_status(Disposition::Answered, "").is_ok());
        assert!(matches!(
            exit_status(Disposition::Unavailable, "quran table missing"),
            Err(AppError::Unavailable(_))
        ));
        assert!(exit_status(Disposition::Failed, "LLM error: timeout").is_err());
        assert!(exit_status(Disposition::BadRequest, "").is_err());
    }

    #[tokio::test]
    async fn test_missing_index_fails_command() {
        let workspace = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.workspace = workspace.path().to_path_buf();
        config.provider = "ollama".to_string();
        config.llm.active_provider = "ollama".to_string();
        config.llm.active_embedding_provider = "hashing".to_string();

        let command = AskCommand {
            topic: vec!["What is zakat?".to_string()],
            topology: None,
            pretty: false,
        };
        let result = command.execute(config).await;
        assert!(matches!(result, Err(AppError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_unknown_topology_rejected() {
        let command = AskCommand {
            topic: vec!["What is zakat?".to_string()],
            topology: Some("parallel".to_string()),
            pretty: false,
        };
        assert!(command.execute(AppConfig::default()).await.is_err());
    }
}
