//! Scripture knowledge for Baseera.
//!
//! Two corpora (Quran, Hadith) are embedded into LanceDB tables by
//! [`ingest::ingest_file`] and searched by [`KnowledgeRetriever`]. Both tables
//! must exist before a retriever can be built.

pub mod corpus;
pub mod embeddings;
pub mod ingest;
pub mod lancedb_store;
pub mod retriever;
pub mod store;

pub use corpus::{Corpus, CorpusPassages, RetrievedPassage};
pub use embeddings::{create_provider, EmbeddingProvider, HashingProvider};
pub use ingest::{ingest_file, IngestReport};
pub use lancedb_store::{LanceDbStore, PassageRow};
pub use retriever::KnowledgeRetriever;
pub use store::{cosine_similarity, ScoredText, VectorStore};
