//! LLM integration for Baseera.
//!
//! A provider-agnostic `LlmClient` trait with Azure OpenAI and Ollama
//! implementations. Pipeline stages receive an `Arc<dyn LlmClient>` built by
//! [`create_client`] from the loaded configuration.
//!
//! # Example
//! ```no_run
//! use baseera_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> baseera_core::AppResult<()> {
//! let client = OllamaClient::new()?;
//! let request = LlmRequest::new("What is salat?", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, create_client_with_key};
pub use providers::{AzureOpenAiClient, OllamaClient};
pub use types::ProviderType;
