//! Sequential stage runner.

use crate::descriptor::PipelineDescriptor;
use crate::envelope::AnswerEnvelope;
use crate::language::detect_language;
use crate::sanitizer::sanitize;
use baseera_core::{AppError, AppResult};
use baseera_llm::{LlmClient, LlmRequest};
use baseera_prompt::{build_stage_prompt, ContextBlock, ANSWER_SCHEMA};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Free-text output of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStageOutput {
    pub stage: String,
    pub content: String,
}

/// Sampling settings applied to every stage call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

/// Runs a stage graph against one LLM, one call per stage.
pub struct SynthesisPipeline {
    llm: Arc<dyn LlmClient>,
    model: String,
    descriptor: PipelineDescriptor,
    settings: GenerationSettings,
}

impl SynthesisPipeline {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        descriptor: PipelineDescriptor,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            descriptor,
            settings,
        }
    }

    pub fn descriptor(&self) -> &PipelineDescriptor {
        &self.descriptor
    }

    /// Run every stage in order and return all stage outputs.
    ///
    /// LLM and tool errors abort the run.
    #[instrument(skip(self), fields(provider = self.llm.provider_name(), model = %self.model))]
    pub async fn run(&self, query: &str) -> AppResult<Vec<AgentStageOutput>> {
        let mut variables = HashMap::new();
        variables.insert("topic".to_string(), query.to_string());
        variables.insert("schema".to_string(), ANSWER_SCHEMA.to_string());

        let mut outputs: Vec<AgentStageOutput> = Vec::with_capacity(self.descriptor.stages().len());

        for stage in self.descriptor.stages() {
            let mut blocks = Vec::new();

            for tool in &stage.tools {
                let output = tool.invoke(query).await?;
                debug!(stage = %stage.id, tool = tool.name(), chars = output.len(), "Tool finished");
                blocks.push(ContextBlock::new(tool.name(), output));
            }

            for dependency in &stage.context {
                let upstream = outputs
                    .iter()
                    .find(|o| &o.stage == dependency)
                    .ok_or_else(|| {
                        AppError::Pipeline(format!(
                            "Stage '{}' is missing output of '{}'",
                            stage.id, dependency
                        ))
                    })?;
                blocks.push(ContextBlock::new(
                    format!("Output of {}", upstream.stage),
                    upstream.content.clone(),
                ));
            }

            let prompt = build_stage_prompt(&stage.definition, &variables, &blocks)?;

            let mut request = LlmRequest::new(prompt.user, self.model.clone())
                .with_system(prompt.system)
                .with_temperature(self.settings.temperature);
            if let Some(max_tokens) = self.settings.max_tokens {
                request = request.with_max_tokens(max_tokens);
            }

            let response = self.llm.complete(&request).await?;
            info!(
                stage = %stage.id,
                tokens = response.usage.total_tokens,
                "Stage complete"
            );

            outputs.push(AgentStageOutput {
                stage: stage.id.clone(),
                content: response.content,
            });
        }

        Ok(outputs)
    }

    /// Run the stages and sanitize the final stage's output into an envelope.
    pub async fn answer(&self, query: &str) -> AppResult<AnswerEnvelope> {
        let language = detect_language(query);
        let outputs = self.run(query).await?;
        let last = outputs
            .last()
            .ok_or_else(|| AppError::Pipeline("Pipeline produced no output".to_string()))?;

        Ok(sanitize(&last.content, language))
    }
}
