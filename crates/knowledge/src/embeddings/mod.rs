//! Query and passage embeddings.
//!
//! The retriever embeds the query with the same provider used at ingestion;
//! mixing providers across the two breaks similarity scores.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{AzureEmbeddingProvider, HashingProvider, OllamaProvider};
