//! Embedding provider trait and factory.

use super::providers::{AzureEmbeddingProvider, HashingProvider, OllamaProvider};
use baseera_core::config::ProviderConfig;
use baseera_core::{AppConfig, AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Request timeout for embedding calls when the provider block sets none.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "azure", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Create the embedding provider named by `llm.activeEmbeddingProvider`.
///
/// `hashing` selects the offline provider; any other name must have a block in
/// `llm.providers`.
pub fn create_provider(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let name = config.llm.active_embedding_provider.as_str();
    let dimensions = config.knowledge.embedding_dim;

    if name == "hashing" {
        return Ok(Arc::new(HashingProvider::new(dimensions)));
    }

    let provider_config = config.get_provider_config(name).ok_or_else(|| {
        AppError::Config(format!("No configuration for embedding provider '{}'", name))
    })?;

    let timeout = Duration::from_secs(provider_config.timeout().unwrap_or(DEFAULT_TIMEOUT_SECS));
    let model = provider_config.embedding_model().ok_or_else(|| {
        AppError::Config(format!("Provider '{}' has no embedding model configured", name))
    })?;

    tracing::debug!(provider = name, model, dimensions, "Creating embedding provider");

    match provider_config {
        ProviderConfig::Azure {
            api_key_env,
            endpoint,
            api_version,
            ..
        } => {
            let api_key = config.resolve_api_key(name).ok_or_else(|| {
                AppError::Config(format!(
                    "Azure embeddings require API key in ${}",
                    api_key_env
                ))
            })?;
            let endpoint = endpoint.as_deref().ok_or_else(|| {
                AppError::Config("Azure embeddings require an endpoint (AZURE_API_BASE)".to_string())
            })?;

            Ok(Arc::new(AzureEmbeddingProvider::new(
                endpoint,
                api_key,
                model,
                api_version.as_deref(),
                dimensions,
                timeout,
            )?))
        }
        ProviderConfig::Ollama { endpoint, .. } => Ok(Arc::new(OllamaProvider::new(
            endpoint, model, dimensions, timeout,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_hashing_provider() {
        let mut config = AppConfig::default();
        config.llm.active_embedding_provider = "hashing".to_string();
        config.knowledge.embedding_dim = 64;

        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), "hashing");
        assert_eq!(provider.dimensions(), 64);
    }

    #[test]
    fn test_create_ollama_provider() {
        let mut config = AppConfig::default();
        config.llm.active_embedding_provider = "ollama".to_string();
        config.knowledge.embedding_dim = 768;

        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.model_name(), "nomic-embed-text");
    }

    #[test]
    fn test_create_unknown_provider() {
        let mut config = AppConfig::default();
        config.llm.active_embedding_provider = "gguf".to_string();

        let result = create_provider(&config);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("No configuration for embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = HashingProvider::new(32);
        let embedding = provider.embed("patience in adversity").await.unwrap();
        assert_eq!(embedding.len(), 32);
    }
}
