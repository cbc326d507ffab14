//! Configuration management for Baseera.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - `.baseera/config.yaml` in the workspace (or the file named by `BASEERA_CONFIG`)
//! - Environment variables (a `.env` file is loaded by the binary beforehand)
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .baseera/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("azure" or "ollama")
    pub provider: String,

    /// Chat model or Azure deployment name
    pub model: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Log format ("pretty" or "json")
    pub log_format: String,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: LlmConfig,

    /// Web search settings
    pub search: SearchConfig,

    /// Vector index settings
    pub knowledge: KnowledgeConfig,

    /// Synthesis pipeline settings
    pub pipeline: PipelineConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(rename = "activeEmbeddingProvider")]
    pub active_embedding_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Azure {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        endpoint: Option<String>,
        deployment: String,
        #[serde(rename = "embeddingDeployment")]
        embedding_deployment: Option<String>,
        #[serde(rename = "apiVersion")]
        api_version: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Chat model (or deployment) for this provider.
    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::Azure { deployment, .. } => deployment,
            ProviderConfig::Ollama { model, .. } => model,
        }
    }

    /// Endpoint for this provider, if one is configured.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::Azure { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }

    /// Embedding model (or deployment) for this provider.
    pub fn embedding_model(&self) -> Option<&str> {
        match self {
            ProviderConfig::Azure {
                embedding_deployment,
                ..
            } => embedding_deployment.as_deref(),
            ProviderConfig::Ollama {
                embedding_model, ..
            } => embedding_model.as_deref(),
        }
    }

    /// Request timeout in seconds.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            ProviderConfig::Azure { timeout, .. } | ProviderConfig::Ollama { timeout, .. } => {
                *timeout
            }
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    /// Wikipedia language edition, also sent to SearxNG as `language`
    pub wikipedia_lang: String,

    /// SearxNG JSON endpoint
    pub searxng_endpoint: String,

    /// Comma-separated SearxNG engines
    pub searxng_engines: String,

    pub wikipedia_limit: usize,
    pub searxng_limit: usize,
    pub wikipedia_timeout_secs: u64,
    pub searxng_timeout_secs: u64,

    /// Character budget for titles and snippets
    pub snippet_max_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            wikipedia_lang: "en".to_string(),
            searxng_endpoint: "http://localhost:8080/search".to_string(),
            searxng_engines: "google,bing,duckduckgo".to_string(),
            wikipedia_limit: 3,
            searxng_limit: 5,
            wikipedia_timeout_secs: 8,
            searxng_timeout_secs: 10,
            snippet_max_chars: 600,
        }
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KnowledgeConfig {
    /// LanceDB directory, relative to the workspace unless absolute
    pub index_path: PathBuf,

    /// Table holding Quran passages
    pub quran_table: String,

    /// Table holding Hadith passages
    pub hadith_table: String,

    /// Passages retrieved per corpus
    pub top_k: usize,

    /// Embedding vector dimension
    pub embedding_dim: usize,

    /// Ingestion chunk size in characters
    pub chunk_size: usize,

    /// Ingestion batch size for embedding requests
    pub batch_size: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from(".baseera/index"),
            quran_table: "quran".to_string(),
            hadith_table: "hadith".to_string(),
            top_k: 5,
            embedding_dim: 1536,
            chunk_size: 1000,
            batch_size: 500,
        }
    }
}

/// Synthesis pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// "full" (research, validate, synthesize) or "simplified" (research, synthesize)
    pub topology: String,

    /// Sampling temperature for every stage
    pub temperature: f32,

    /// Token cap per stage
    pub max_tokens: Option<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topology: "full".to_string(),
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    search: Option<SearchConfig>,
    knowledge: Option<KnowledgeConfig>,
    pipeline: Option<PipelineConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let mut providers = HashMap::new();

        providers.insert(
            "azure".to_string(),
            ProviderConfig::Azure {
                api_key_env: "AZURE_API_KEY".to_string(),
                endpoint: None,
                deployment: "gpt-4o".to_string(),
                embedding_deployment: Some("text-embedding-3-small".to_string()),
                api_version: Some("2024-02-01".to_string()),
                timeout: Some(120),
            },
        );

        providers.insert(
            "ollama".to_string(),
            ProviderConfig::Ollama {
                endpoint: "http://localhost:11434".to_string(),
                model: "llama3.2".to_string(),
                embedding_model: Some("nomic-embed-text".to_string()),
                timeout: Some(120),
            },
        );

        Self {
            active_provider: "azure".to_string(),
            active_embedding_provider: "azure".to_string(),
            providers,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "azure".to_string(),
            model: "gpt-4o".to_string(),
            log_level: None,
            log_format: "pretty".to_string(),
            verbose: false,
            no_color: false,
            llm: LlmConfig::default(),
            search: SearchConfig::default(),
            knowledge: KnowledgeConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file, and environment variables.
    ///
    /// Environment variables:
    /// - `BASEERA_WORKSPACE`, `BASEERA_CONFIG`: workspace and config file
    /// - `BASEERA_PROVIDER`, `BASEERA_MODEL`, `BASEERA_TOPOLOGY`
    /// - `AZURE_API_BASE`, `AZURE_API_VERSION`, `AZURE_CHAT_DEPLOYMENT_NAME`,
    ///   `AZURE_EMBEDDING_DEPLOYMENT_NAME`, `OLLAMA_URL`
    /// - `SEARXNG_ENDPOINT`, `SEARXNG_ENGINES`, `WIKIPEDIA_LANG`
    /// - `QURAN_COLLECTION`, `HADITH_COLLECTION`
    /// - `RUST_LOG`, `NO_COLOR`
    ///
    /// # Example
    /// ```no_run
    /// use baseera_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using a custom environment lookup.
    pub fn load_with<F>(env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load_at(None, None, env)
    }

    /// Load configuration from an explicit workspace and/or config file.
    ///
    /// `workspace` and `config_file` (the `--workspace` and `--config` flags)
    /// win over `BASEERA_WORKSPACE` and `BASEERA_CONFIG`, and decide which YAML
    /// file is merged.
    pub fn load_at<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        env: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env("BASEERA_WORKSPACE").map(PathBuf::from)) {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env("BASEERA_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.baseera_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        config.apply_env(env);

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();
            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }
            result.llm = llm;
        }

        if let Some(search) = config_file.search {
            result.search = search;
        }

        if let Some(knowledge) = config_file.knowledge {
            result.knowledge = knowledge;
        }

        if let Some(pipeline) = config_file.pipeline {
            result.pipeline = pipeline;
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply environment variable overrides.
    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(azure) = self.llm.providers.get_mut("azure") {
            if let ProviderConfig::Azure {
                endpoint,
                deployment,
                embedding_deployment,
                api_version,
                ..
            } = azure
            {
                if let Some(base) = env("AZURE_API_BASE") {
                    *endpoint = Some(base);
                }
                if let Some(name) = env("AZURE_CHAT_DEPLOYMENT_NAME") {
                    *deployment = name;
                }
                if let Some(name) = env("AZURE_EMBEDDING_DEPLOYMENT_NAME") {
                    *embedding_deployment = Some(name);
                }
                if let Some(version) = env("AZURE_API_VERSION") {
                    *api_version = Some(version);
                }
            }
        }

        if let Some(url) = env("OLLAMA_URL") {
            if let Some(ProviderConfig::Ollama { endpoint, .. }) =
                self.llm.providers.get_mut("ollama")
            {
                *endpoint = url;
            }
        }

        if let Some(provider) = env("BASEERA_PROVIDER") {
            self.llm.active_provider = provider.clone();
            self.provider = provider;
        }

        self.model = match env("BASEERA_MODEL") {
            Some(model) => model,
            None => self
                .llm
                .providers
                .get(&self.provider)
                .map(|pc| pc.model().to_string())
                .unwrap_or_else(|| self.model.clone()),
        };

        if let Some(topology) = env("BASEERA_TOPOLOGY") {
            self.pipeline.topology = topology;
        }

        if let Some(endpoint) = env("SEARXNG_ENDPOINT") {
            self.search.searxng_endpoint = endpoint;
        }
        if let Some(engines) = env("SEARXNG_ENGINES") {
            self.search.searxng_engines = engines;
        }
        if let Some(lang) = env("WIKIPEDIA_LANG") {
            self.search.wikipedia_lang = lang;
        }

        if let Some(table) = env("QURAN_COLLECTION") {
            self.knowledge.quran_table = table;
        }
        if let Some(table) = env("HADITH_COLLECTION") {
            self.knowledge.hadith_table = table;
        }

        if let Some(level) = env("RUST_LOG") {
            self.log_level = Some(level);
        }

        if env("NO_COLOR").is_some() {
            self.no_color = true;
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    ///
    /// Workspace and config file are applied at load time; see [`AppConfig::load_at`].
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            if let Some(pc) = self.llm.providers.get(&provider) {
                self.model = pc.model().to_string();
            }
            self.llm.active_provider = provider.clone();
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .baseera directory.
    pub fn baseera_dir(&self) -> PathBuf {
        self.workspace.join(".baseera")
    }

    /// Ensure the .baseera directory exists.
    pub fn ensure_baseera_dir(&self) -> AppResult<()> {
        let dir = self.baseera_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .baseera directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Absolute path of the LanceDB index directory.
    pub fn index_path(&self) -> PathBuf {
        if self.knowledge.index_path.is_absolute() {
            self.knowledge.index_path.clone()
        } else {
            self.workspace.join(&self.knowledge.index_path)
        }
    }

    /// Get a provider configuration by name.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.providers.get(provider)
    }

    /// Resolve the API key for a provider from its configured environment variable.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        match self.get_provider_config(provider)? {
            ProviderConfig::Azure { api_key_env, .. } => std::env::var(api_key_env).ok(),
            ProviderConfig::Ollama { .. } => None,
        }
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["azure", "ollama"];

        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        match self.get_provider_config(&self.provider) {
            Some(ProviderConfig::Azure {
                api_key_env,
                endpoint,
                ..
            }) => {
                if std::env::var(api_key_env).is_err() {
                    return Err(AppError::Config(format!(
                        "API key not found in environment variable: {}",
                        api_key_env
                    )));
                }
                if endpoint.is_none() {
                    return Err(AppError::Config(
                        "Azure endpoint not configured (set AZURE_API_BASE)".to_string(),
                    ));
                }
            }
            Some(ProviderConfig::Ollama { .. }) => {}
            None => {
                return Err(AppError::Config(format!(
                    "No configuration for provider: {}",
                    self.provider
                )));
            }
        }

        if !matches!(self.pipeline.topology.as_str(), "full" | "simplified") {
            return Err(AppError::Config(format!(
                "Unknown pipeline topology: {}. Supported: full, simplified",
                self.pipeline.topology
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "azure");
        assert_eq!(config.knowledge.top_k, 5);
        assert_eq!(config.search.snippet_max_chars, 600);
        assert_eq!(config.pipeline.topology, "full");
        assert!(!config.verbose);
    }

    #[test]
    fn test_baseera_dir() {
        let config = AppConfig::default();
        assert!(config.baseera_dir().ends_with(".baseera"));
    }

    #[test]
    fn test_env_overrides() {
        let temp = TempDir::new().unwrap();
        let workspace = temp.path().to_string_lossy().to_string();
        let config = AppConfig::load_with(env_from(&[
            ("BASEERA_WORKSPACE", workspace.as_str()),
            ("AZURE_API_BASE", "https://example.openai.azure.com"),
            ("AZURE_CHAT_DEPLOYMENT_NAME", "chat-prod"),
            ("QURAN_COLLECTION", "quran_v2"),
            ("SEARXNG_ENDPOINT", "http://searx.local/search"),
            ("BASEERA_TOPOLOGY", "simplified"),
        ]))
        .unwrap();

        assert_eq!(config.model, "chat-prod");
        assert_eq!(config.knowledge.quran_table, "quran_v2");
        assert_eq!(config.search.searxng_endpoint, "http://searx.local/search");
        assert_eq!(config.pipeline.topology, "simplified");
        assert_eq!(
            config.get_provider_config("azure").and_then(|p| p.endpoint()),
            Some("https://example.openai.azure.com")
        );
    }

    #[test]
    fn test_yaml_merge() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".baseera");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.yaml"),
            r#"
llm:
  activeProvider: ollama
  activeEmbeddingProvider: ollama
  providers:
    ollama:
      endpoint: http://gpu-box:11434
      model: qwen2.5
      embeddingModel: nomic-embed-text
search:
  wikipediaLang: id
  searxngLimit: 8
knowledge:
  hadithTable: bukhari
logging:
  format: json
"#,
        )
        .unwrap();

        let workspace = temp.path().to_string_lossy().to_string();
        let config =
            AppConfig::load_with(env_from(&[("BASEERA_WORKSPACE", workspace.as_str())])).unwrap();

        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "qwen2.5");
        assert_eq!(config.search.wikipedia_lang, "id");
        assert_eq!(config.search.searxng_limit, 8);
        assert_eq!(config.search.wikipedia_limit, 3);
        assert_eq!(config.knowledge.hadith_table, "bukhari");
        assert_eq!(config.knowledge.quran_table, "quran");
        assert_eq!(config.log_format, "json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_config_file_is_merged() {
        let env_workspace = TempDir::new().unwrap();
        let flag_workspace = TempDir::new().unwrap();
        let custom = flag_workspace.path().join("custom.yaml");
        std::fs::write(&custom, "pipeline:\n  topology: simplified\nsearch:\n  wikipediaLang: id\n")
            .unwrap();

        let env_path = env_workspace.path().to_string_lossy().to_string();
        let config = AppConfig::load_at(
            Some(flag_workspace.path().to_path_buf()),
            Some(custom.clone()),
            env_from(&[("BASEERA_WORKSPACE", env_path.as_str())]),
        )
        .unwrap();

        assert_eq!(config.workspace, flag_workspace.path());
        assert_eq!(config.config_file, Some(custom));
        assert_eq!(config.pipeline.topology, "simplified");
        assert_eq!(config.search.wikipedia_lang, "id");
    }

    #[test]
    fn test_explicit_workspace_reads_its_config() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".baseera");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.yaml"), "knowledge:\n  quranTable: quran_id\n").unwrap();

        let config = AppConfig::load_at(
            Some(temp.path().to_path_buf()),
            None,
            env_from(&[]),
        )
        .unwrap();

        assert_eq!(config.knowledge.quran_table, "quran_id");
    }

    #[test]
    fn test_missing_workspace_rejected() {
        let result = AppConfig::load_with(env_from(&[(
            "BASEERA_WORKSPACE",
            "/definitely/not/a/real/workspace",
        )]));
        assert!(result.is_err());
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("ollama".to_string()),
            None,
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_index_path_relative_to_workspace() {
        let mut config = AppConfig::default();
        config.workspace = PathBuf::from("/srv/baseera");
        assert_eq!(config.index_path(), PathBuf::from("/srv/baseera/.baseera/index"));

        config.knowledge.index_path = PathBuf::from("/data/lance");
        assert_eq!(config.index_path(), PathBuf::from("/data/lance"));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_topology() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        config.pipeline.topology = "parallel".to_string();
        assert!(config.validate().is_err());
    }
}
