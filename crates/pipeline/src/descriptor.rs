//! Stage graph: which stages run, with which tools, reading which upstream
//! outputs.

use crate::tool::Tool;
use baseera_core::{AppError, AppResult};
use baseera_prompt::{load_stage, StageDefinition};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Stage layouts the runner supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    /// research (knowledge + web) -> synthesize
    Simplified,
    /// research (knowledge) -> validate (web) -> synthesize
    #[default]
    Full,
}

impl Topology {
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(Topology::Full),
            "simplified" => Ok(Topology::Simplified),
            other => Err(AppError::Config(format!(
                "Unknown topology: {}. Expected full or simplified",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::Simplified => "simplified",
            Topology::Full => "full",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the stage graph.
#[derive(Clone)]
pub struct StageSpec {
    pub id: String,
    pub definition: StageDefinition,
    pub tools: Vec<Arc<dyn Tool>>,
    /// Upstream stage ids whose outputs are passed in, in this order
    pub context: Vec<String>,
}

impl StageSpec {
    pub fn new(definition: StageDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            definition,
            tools: Vec::new(),
            context: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_context(mut self, stage_id: impl Into<String>) -> Self {
        self.context.push(stage_id.into());
        self
    }
}

impl fmt::Debug for StageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageSpec")
            .field("id", &self.id)
            .field("tools", &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("context", &self.context)
            .finish()
    }
}

/// Validated, ordered stage list. The last stage produces the answer.
#[derive(Debug, Clone)]
pub struct PipelineDescriptor {
    stages: Vec<StageSpec>,
}

impl PipelineDescriptor {
    /// Validate stage order: ids are unique and each stage only reads stages
    /// declared before it.
    pub fn new(stages: Vec<StageSpec>) -> AppResult<Self> {
        if stages.is_empty() {
            return Err(AppError::Pipeline("Pipeline has no stages".to_string()));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for stage in &stages {
            for dependency in &stage.context {
                if !seen.contains(dependency.as_str()) {
                    return Err(AppError::Pipeline(format!(
                        "Stage '{}' depends on '{}', which is not an earlier stage",
                        stage.id, dependency
                    )));
                }
            }
            if !seen.insert(stage.id.as_str()) {
                return Err(AppError::Pipeline(format!(
                    "Duplicate stage id: {}",
                    stage.id
                )));
            }
        }

        Ok(Self { stages })
    }

    /// Load the built-in (or workspace-overridden) stages for a topology and
    /// wire the tools.
    pub fn for_topology(
        topology: Topology,
        workspace: &Path,
        knowledge: Arc<dyn Tool>,
        web: Arc<dyn Tool>,
    ) -> AppResult<Self> {
        let research = load_stage(workspace, "research")?;
        let synthesize = load_stage(workspace, "synthesize")?;

        let stages = match topology {
            Topology::Simplified => vec![
                StageSpec::new(research).with_tool(knowledge).with_tool(web),
                StageSpec::new(synthesize).with_context("research"),
            ],
            Topology::Full => vec![
                StageSpec::new(research).with_tool(knowledge),
                StageSpec::new(load_stage(workspace, "validate")?).with_tool(web),
                StageSpec::new(synthesize)
                    .with_context("research")
                    .with_context("validate"),
            ],
        };

        Self::new(stages)
    }

    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    pub fn stage_ids(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "Echo"
        }

        fn description(&self) -> &str {
            "Returns the query"
        }

        async fn invoke(&self, query: &str) -> AppResult<String> {
            Ok(query.to_string())
        }
    }

    fn stage(id: &str) -> StageSpec {
        let mut definition = load_stage(Path::new("."), "research").unwrap();
        definition.id = id.to_string();
        StageSpec::new(definition)
    }

    #[test]
    fn test_topology_parse() {
        assert_eq!(Topology::parse("FULL").unwrap(), Topology::Full);
        assert_eq!(Topology::parse("simplified").unwrap(), Topology::Simplified);
        assert!(Topology::parse("parallel").is_err());
        assert_eq!(Topology::default(), Topology::Full);
    }

    #[test]
    fn test_forward_dependency_rejected() {
        let result = PipelineDescriptor::new(vec![
            stage("a").with_context("b"),
            stage("b"),
        ]);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("not an earlier stage"));
    }

    #[test]
    fn test_self_dependency_rejected() {
        assert!(PipelineDescriptor::new(vec![stage("a").with_context("a")]).is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        assert!(PipelineDescriptor::new(vec![stage("a"), stage("a")]).is_err());
        assert!(PipelineDescriptor::new(Vec::new()).is_err());
    }

    #[test]
    fn test_builtin_topologies() {
        let tool: Arc<dyn Tool> = Arc::new(EchoTool);
        let workspace = tempfile::tempdir().unwrap();

        let full =
            PipelineDescriptor::for_topology(Topology::Full, workspace.path(), tool.clone(), tool.clone())
                .unwrap();
        assert_eq!(full.stage_ids(), vec!["research", "validate", "synthesize"]);
        assert!(full.stages()[1].context.is_empty());
        assert_eq!(full.stages()[2].context, vec!["research", "validate"]);

        let simplified =
            PipelineDescriptor::for_topology(Topology::Simplified, workspace.path(), tool.clone(), tool)
                .unwrap();
        assert_eq!(simplified.stage_ids(), vec!["research", "synthesize"]);
        assert_eq!(simplified.stages()[0].tools.len(), 2);
    }
}
