//! Azure OpenAI embeddings provider.

use super::ollama::check_dimensions;
use crate::embeddings::EmbeddingProvider;
use baseera_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

const DEFAULT_API_VERSION: &str = "2024-02-01";

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Embeddings from an Azure OpenAI deployment (e.g. `text-embedding-3-small`).
#[derive(Debug)]
pub struct AzureEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
    dimensions: usize,
}

impl AzureEmbeddingProvider {
    pub fn new(
        endpoint: &str,
        api_key: String,
        deployment: &str,
        api_version: Option<&str>,
        dimensions: usize,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Knowledge(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            deployment: deployment.to_string(),
            api_version: api_version.unwrap_or(DEFAULT_API_VERSION).to_string(),
            dimensions,
        })
    }

    fn embeddings_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    /// Order by `index` and check count and dimensions.
    fn collect(&self, mut response: EmbeddingResponse, expected: usize) -> AppResult<Vec<Vec<f32>>> {
        if response.data.len() != expected {
            return Err(AppError::Knowledge(format!(
                "Azure returned {} embeddings for {} inputs",
                response.data.len(),
                expected
            )));
        }

        response.data.sort_by_key(|item| item.index);
        response
            .data
            .into_iter()
            .map(|item| {
                check_dimensions(&item.embedding, self.dimensions)?;
                Ok(item.embedding)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for AzureEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "azure"
    }

    fn model_name(&self) -> &str {
        &self.deployment
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), provider = "azure"))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(self.embeddings_url())
            .header("api-key", &self.api_key)
            .json(&EmbeddingRequest { input: texts })
            .send()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to reach Azure embeddings: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Knowledge(format!(
                "Azure embeddings error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::Knowledge(format!("Failed to parse Azure embeddings response: {}", e))
        })?;

        self.collect(body, texts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(dimensions: usize) -> AzureEmbeddingProvider {
        AzureEmbeddingProvider::new(
            "https://baseera.openai.azure.com/",
            "key".to_string(),
            "text-embedding-3-small",
            None,
            dimensions,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_embeddings_url() {
        assert_eq!(
            provider(3).embeddings_url(),
            "https://baseera.openai.azure.com/openai/deployments/text-embedding-3-small/embeddings?api-version=2024-02-01"
        );
    }

    #[test]
    fn test_collect_orders_by_index() {
        let body: EmbeddingResponse = serde_json::from_str(
            r#"{"object":"list","data":[
                {"object":"embedding","index":1,"embedding":[0.0,1.0]},
                {"object":"embedding","index":0,"embedding":[1.0,0.0]}
            ],"model":"text-embedding-3-small"}"#,
        )
        .unwrap();

        let vectors = provider(2).collect(body, 2).unwrap();
        assert_eq!(vectors[0], vec![1.0, 0.0]);
        assert_eq!(vectors[1], vec![0.0, 1.0]);
    }

    #[test]
    fn test_collect_rejects_wrong_count_or_dimension() {
        let body: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"index":0,"embedding":[1.0]}]}"#).unwrap();
        assert!(provider(1).collect(body, 2).is_err());

        let body: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"index":0,"embedding":[1.0]}]}"#).unwrap();
        assert!(provider(4).collect(body, 1).is_err());
    }
}
