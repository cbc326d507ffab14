//! Embedding provider implementations.

pub mod azure;
pub mod hashing;
pub mod ollama;

pub use azure::AzureEmbeddingProvider;
pub use hashing::HashingProvider;
pub use ollama::OllamaProvider;
