//! LLM provider factory.
//!
//! Resolves the active provider from `AppConfig`, injects its secret from the
//! environment, and builds the matching client.

use crate::client::LlmClient;
use crate::providers::{AzureOpenAiClient, OllamaClient};
use crate::types::ProviderType;
use baseera_core::config::ProviderConfig;
use baseera_core::{AppConfig, AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Create the chat client for the configured provider.
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown, has no configuration
/// block, or is missing its endpoint or API key.
pub fn create_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let api_key = config.resolve_api_key(&config.provider);
    create_client_with_key(config, api_key)
}

/// Same as [`create_client`] with the API key supplied by the caller.
pub fn create_client_with_key(
    config: &AppConfig,
    api_key: Option<String>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider = ProviderType::parse(&config.provider)?;
    let provider_config = config.get_provider_config(provider.as_str()).ok_or_else(|| {
        AppError::Config(format!("No configuration for provider '{}'", provider))
    })?;

    let timeout = Duration::from_secs(provider_config.timeout().unwrap_or(DEFAULT_TIMEOUT_SECS));

    tracing::debug!(provider = %provider, model = %config.model, "Creating LLM client");

    match (provider, provider_config) {
        (
            ProviderType::Azure,
            ProviderConfig::Azure {
                api_key_env,
                endpoint,
                api_version,
                ..
            },
        ) => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config(format!(
                    "Azure provider requires API key in ${}",
                    api_key_env
                ))
            })?;
            let endpoint = endpoint.as_deref().unwrap_or_default();
            let client =
                AzureOpenAiClient::new(endpoint, api_key, api_version.as_deref(), timeout)?;
            Ok(Arc::new(client))
        }
        (ProviderType::Ollama, ProviderConfig::Ollama { endpoint, .. }) => {
            Ok(Arc::new(OllamaClient::with_base_url(endpoint.as_str(), timeout)?))
        }
        (provider, _) => Err(AppError::Config(format!(
            "Configuration block for '{}' does not match the provider type",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(provider: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.provider = provider.to_string();
        config
    }

    #[test]
    fn test_create_ollama_client() {
        let client = create_client_with_key(&config_for("ollama"), None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_azure_requires_api_key() {
        let mut config = config_for("azure");
        if let Some(ProviderConfig::Azure { endpoint, .. }) = config.llm.providers.get_mut("azure") {
            *endpoint = Some("https://baseera.openai.azure.com".to_string());
        }

        match create_client_with_key(&config, None) {
            Err(AppError::Config(msg)) => assert!(msg.contains("API key")),
            other => panic!("Expected config error, got {:?}", other.map(|_| ())),
        }

        let client = create_client_with_key(&config, Some("key".to_string())).unwrap();
        assert_eq!(client.provider_name(), "azure");
    }

    #[test]
    fn test_azure_requires_endpoint() {
        let mut config = config_for("azure");
        if let Some(ProviderConfig::Azure { endpoint, .. }) = config.llm.providers.get_mut("azure") {
            *endpoint = None;
        }
        assert!(create_client_with_key(&config, Some("key".to_string())).is_err());
    }

    #[test]
    fn test_unknown_provider() {
        assert!(matches!(
            create_client_with_key(&config_for("claude"), None),
            Err(AppError::Config(_))
        ));
    }
}
