//! Stage definitions and prompt rendering for the Baseera pipeline.
//!
//! Built-in stages (`research`, `validate`, `synthesize`) are embedded YAML and
//! can be overridden per workspace under `.baseera/stages/`.

pub mod builder;
pub mod loader;
pub mod schema;
pub mod types;

pub use builder::build_stage_prompt;
pub use loader::{load_stage, STAGES_DIR};
pub use schema::ANSWER_SCHEMA;
pub use types::{BuiltStageMetadata, BuiltStagePrompt, ContextBlock, StageDefinition};
