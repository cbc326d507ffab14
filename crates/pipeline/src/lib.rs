//! Baseera answer pipeline.
//!
//! A query is first checked against the small-talk table. Everything else runs
//! through a short chain of LLM stages fed by Quran/Hadith retrieval and tiered
//! web search; the final stage's JSON is sanitized into an `AnswerEnvelope`.

pub mod boundary;
pub mod build;
pub mod context;
pub mod descriptor;
pub mod envelope;
pub mod handle;
pub mod language;
pub mod runner;
pub mod sanitizer;
pub mod small_talk;
pub mod tool;

#[cfg(test)]
mod tests;

pub use boundary::{answer_query, handle_query, BoundaryResponse, Disposition};
pub use build::{build_pipeline, build_pipeline_with, EvidenceSources};
pub use context::{assemble, render_scripture, render_web, AssembledContext, NO_WEB_RESULTS};
pub use descriptor::{PipelineDescriptor, StageSpec, Topology};
pub use envelope::{AnswerEnvelope, Language, Status, MAX_FOLLOW_UPS};
pub use handle::{AppContext, PipelineHandle};
pub use language::detect_language;
pub use runner::{AgentStageOutput, GenerationSettings, SynthesisPipeline};
pub use sanitizer::sanitize;
pub use small_talk::{Intent, SmallTalkInterceptor};
pub use tool::{KnowledgeSearchTool, Tool, WebSearchTool};
