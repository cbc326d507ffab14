//! Command handlers for the Baseera CLI.

pub mod ask;
pub mod context;
pub mod ingest;
pub mod serve;

pub use ask::AskCommand;
pub use context::ContextCommand;
pub use ingest::IngestCommand;
pub use serve::ServeCommand;
