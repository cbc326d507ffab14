//! Azure OpenAI chat completions provider.
//!
//! Endpoint shape:
//! `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={version}`
//! with the key sent in the `api-key` header.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use baseera_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-02-01";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Azure OpenAI client. The request's `model` is the deployment name.
pub struct AzureOpenAiClient {
    endpoint: String,
    api_key: String,
    api_version: String,
    client: reqwest::Client,
}

impl AzureOpenAiClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        api_version: Option<&str>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(AppError::Config(
                "Azure provider requires an endpoint (AZURE_API_BASE)".to_string(),
            ));
        }

        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(AppError::Config(
                "Azure provider requires an API key".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to build Azure HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            api_version: api_version.unwrap_or(DEFAULT_API_VERSION).to_string(),
            client,
        })
    }

    fn completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, deployment, self.api_version
        )
    }

    fn to_chat_request(&self, request: &LlmRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt.clone(),
        });

        ChatRequest {
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    fn convert_response(&self, deployment: &str, response: ChatResponse) -> AppResult<LlmResponse> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Llm("Azure response contained no choices".to_string()))?;

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: response.model.unwrap_or_else(|| deployment.to_string()),
            usage,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for AzureOpenAiClient {
    fn provider_name(&self) -> &str {
        "azure"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(deployment = %request.model, "Sending chat completion to Azure OpenAI");

        let url = self.completions_url(&request.model);
        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&self.to_chat_request(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to reach Azure OpenAI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Azure OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Azure response: {}", e)))?;

        let converted = self.convert_response(&request.model, chat)?;
        tracing::debug!(
            tokens = converted.usage.total_tokens,
            "Received completion from Azure OpenAI"
        );
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AzureOpenAiClient {
        AzureOpenAiClient::new(
            "https://baseera.openai.azure.com/",
            "secret",
            None,
            Duration::from_secs(10),
        )
        .unwrap()
    }

    #[test]
    fn test_completions_url() {
        assert_eq!(
            client().completions_url("gpt-4o"),
            "https://baseera.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-02-01"
        );
    }

    #[test]
    fn test_missing_endpoint_or_key() {
        assert!(AzureOpenAiClient::new("", "k", None, Duration::from_secs(1)).is_err());
        assert!(AzureOpenAiClient::new("https://x", "", None, Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_system_message_comes_first() {
        let request = LlmRequest::new("What is wudu?", "gpt-4o").with_system("Scholar");
        let chat = client().to_chat_request(&request);
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert_eq!(chat.messages[1].content, "What is wudu?");
    }

    #[test]
    fn test_response_conversion() {
        let raw: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{\"answer\":\"x\"}"},"finish_reason":"stop"}],
                "usage":{"prompt_tokens":40,"completion_tokens":10,"total_tokens":50}}"#,
        )
        .unwrap();
        let response = client().convert_response("gpt-4o", raw).unwrap();
        assert_eq!(response.content, "{\"answer\":\"x\"}");
        assert_eq!(response.model, "gpt-4o");
        assert_eq!(response.usage.total_tokens, 50);
    }

    #[test]
    fn test_empty_choices_is_error() {
        let raw: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(client().convert_response("gpt-4o", raw).is_err());
    }
}
