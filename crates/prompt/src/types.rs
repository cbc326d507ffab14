//! Stage definition types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One pipeline stage as declared in YAML.
///
/// `goal`, `description` and `expectedOutput` are Handlebars templates; the
/// runner supplies `topic` and, for the synthesis stage, `schema`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Stage identifier ("research", "validate", "synthesize")
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Persona the model adopts
    pub role: String,

    pub goal: String,

    #[serde(default)]
    pub backstory: String,

    /// Task text shown to the model
    pub description: String,

    #[serde(rename = "expectedOutput")]
    pub expected_output: String,
}

/// A labeled block appended to a stage's user prompt (tool output or upstream
/// stage output).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBlock {
    pub label: String,
    pub content: String,
}

impl ContextBlock {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }
}

/// A fully rendered stage prompt ready for one LLM call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltStagePrompt {
    /// System message: role, goal, backstory
    pub system: String,

    /// User message: task, expected output, context blocks
    pub user: String,

    pub metadata: BuiltStageMetadata,
}

/// Metadata about a built stage prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltStageMetadata {
    #[serde(rename = "stageId")]
    pub stage_id: String,

    /// Labels of the context blocks, in order
    #[serde(rename = "contextLabels")]
    pub context_labels: Vec<String>,

    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: HashMap<String, String>,
}
