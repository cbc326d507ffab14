//! Stage loader: workspace overrides first, then the built-in set.

use crate::types::StageDefinition;
use baseera_core::{AppError, AppResult};
use std::path::Path;

/// Directory (relative to the workspace) holding stage overrides.
pub const STAGES_DIR: &str = ".baseera/stages";

const BUILTIN_STAGES: &[(&str, &str)] = &[
    ("research", include_str!("../stages/research.yml")),
    ("validate", include_str!("../stages/validate.yml")),
    ("synthesize", include_str!("../stages/synthesize.yml")),
];

/// Load a stage definition by ID.
///
/// Looks for `.baseera/stages/<id>.yml` in the workspace and falls back to the
/// built-in definition of the same ID.
///
/// # Example
/// ```no_run
/// use baseera_prompt::load_stage;
/// use std::path::Path;
///
/// # fn example() -> baseera_core::AppResult<()> {
/// let stage = load_stage(Path::new("."), "research")?;
/// println!("Loaded stage: {}", stage.title);
/// # Ok(())
/// # }
/// ```
pub fn load_stage(workspace_path: &Path, stage_id: &str) -> AppResult<StageDefinition> {
    let stage_file = workspace_path
        .join(STAGES_DIR)
        .join(format!("{}.yml", stage_id));

    let definition = if stage_file.exists() {
        tracing::debug!("Loading stage override from: {:?}", stage_file);

        let contents = std::fs::read_to_string(&stage_file).map_err(|e| {
            AppError::Prompt(format!("Failed to read stage file {:?}: {}", stage_file, e))
        })?;

        parse_stage(&contents).map_err(|e| {
            AppError::Prompt(format!("Failed to parse stage YAML {:?}: {}", stage_file, e))
        })?
    } else {
        let (_, contents) = BUILTIN_STAGES
            .iter()
            .find(|(id, _)| *id == stage_id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown stage: {}", stage_id)))?;

        parse_stage(contents)?
    };

    if definition.id != stage_id {
        return Err(AppError::Prompt(format!(
            "Stage file for '{}' declares id '{}'",
            stage_id, definition.id
        )));
    }

    validate_stage(&definition)?;

    tracing::debug!("Loaded stage: {} ({})", definition.id, definition.title);

    Ok(definition)
}

fn parse_stage(contents: &str) -> AppResult<StageDefinition> {
    serde_yaml::from_str(contents).map_err(|e| AppError::Prompt(e.to_string()))
}

/// Validate a stage definition.
fn validate_stage(def: &StageDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Stage ID cannot be empty".to_string()));
    }

    if def.role.trim().is_empty() {
        return Err(AppError::Prompt(format!(
            "Stage '{}' must declare a role",
            def.id
        )));
    }

    if def.description.trim().is_empty() {
        return Err(AppError::Prompt(format!(
            "Stage '{}' description cannot be empty",
            def.id
        )));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
