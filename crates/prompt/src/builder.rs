//! Stage prompt builder: Handlebars rendering plus context block layout.

use crate::types::{BuiltStageMetadata, BuiltStagePrompt, ContextBlock, StageDefinition};
use baseera_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build the system and user messages for one stage.
///
/// The system message carries role, goal and backstory. The user message is the
/// rendered description, the expected output, then each context block under its
/// label, in the order given.
///
/// # Example
/// ```no_run
/// use baseera_prompt::{build_stage_prompt, load_stage, ContextBlock};
/// use std::collections::HashMap;
/// use std::path::Path;
///
/// # fn example() -> baseera_core::AppResult<()> {
/// let stage = load_stage(Path::new("."), "research")?;
/// let mut vars = HashMap::new();
/// vars.insert("topic".to_string(), "What is zakat?".to_string());
///
/// let blocks = [ContextBlock::new("Knowledge search", "QURANIC SOURCES:\n...")];
/// let built = build_stage_prompt(&stage, &vars, &blocks)?;
/// println!("{}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_stage_prompt(
    definition: &StageDefinition,
    variables: &HashMap<String, String>,
    context: &[ContextBlock],
) -> AppResult<BuiltStagePrompt> {
    tracing::debug!("Building stage prompt: {}", definition.id);

    let handlebars = new_renderer();

    let goal = render(&handlebars, &definition.goal, variables)?;
    let backstory = render(&handlebars, &definition.backstory, variables)?;
    let description = render(&handlebars, &definition.description, variables)?;
    let expected_output = render(&handlebars, &definition.expected_output, variables)?;

    let mut system = format!("You are {}. {}", definition.role, goal.trim());
    if !backstory.trim().is_empty() {
        system.push_str("\n\n");
        system.push_str(backstory.trim());
    }

    let mut user = description.trim().to_string();
    user.push_str("\n\nExpected output: ");
    user.push_str(expected_output.trim());

    for block in context {
        user.push_str(&format!("\n\n### {}\n{}", block.label, block.content.trim_end()));
    }

    Ok(BuiltStagePrompt {
        system,
        user,
        metadata: BuiltStageMetadata {
            stage_id: definition.id.clone(),
            context_labels: context.iter().map(|b| b.label.clone()).collect(),
            resolved_variables: variables.clone(),
        },
    })
}

fn new_renderer() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    // Prompts are plain text; HTML escaping would mangle quotes in the schema.
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
}

fn render(
    handlebars: &Handlebars<'_>,
    template: &str,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    handlebars
        .render_template(template, variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
