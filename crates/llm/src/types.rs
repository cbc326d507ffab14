//! Provider identifiers.

use baseera_core::{AppError, AppResult};
use std::fmt;

/// Supported chat backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    /// Azure OpenAI chat completions
    Azure,
    /// Local Ollama runtime
    Ollama,
}

impl ProviderType {
    /// Parse a provider name as it appears in config or `BASEERA_PROVIDER`.
    pub fn parse(name: &str) -> AppResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "azure" | "azure-openai" => Ok(ProviderType::Azure),
            "ollama" => Ok(ProviderType::Ollama),
            other => Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: azure, ollama",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Azure => "azure",
            ProviderType::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
