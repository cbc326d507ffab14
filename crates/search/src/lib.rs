//! Web search for Baseera.
//!
//! A regex router picks the encyclopedia (Wikipedia) or general web (SearxNG)
//! provider for a query; `TieredWebSearch` falls back to the other provider when
//! the first returns nothing. Provider failures never surface as errors.

pub mod provider;
pub mod router;
pub mod searxng;
pub mod text;
pub mod tiered;
pub mod types;
pub mod wikipedia;

pub use provider::{user_agent, WebSearchProvider};
pub use router::SourceRouter;
pub use searxng::SearxngProvider;
pub use text::{strip_html, trim_text, SNIPPET_MAX_CHARS};
pub use tiered::TieredWebSearch;
pub use types::{NormalizedSearchResult, Provider, Tier, WebSearchOutcome};
pub use wikipedia::WikipediaProvider;
