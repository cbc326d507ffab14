//! Error types for Baseera.
//!
//! One error enum covers every failure category in the workspace: configuration,
//! I/O, LLM, knowledge retrieval, web search, prompts, and pipeline execution.

use thiserror::Error;

/// Unified error type for Baseera.
///
/// Library functions return `Result<T, AppError>`. The request boundary in
/// `baseera-pipeline` is the only place that turns an `AppError` into an answer
/// envelope; nothing below it panics.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM backend errors (unreachable, auth, bad response)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Vector store and embedding errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Web search errors that escaped a provider
    #[error("Search error: {0}")]
    Search(String),

    /// Stage definition and template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Pipeline wiring and execution errors
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// A hard dependency (e.g. a corpus index) is missing
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Whether the error means the pipeline cannot be built right now.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AppError::Unavailable(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
