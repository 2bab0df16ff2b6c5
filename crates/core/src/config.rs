//! Configuration management for Companion.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (.companion/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources override earlier ones.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Completion providers the factory knows how to build.
pub const KNOWN_LLM_PROVIDERS: [&str; 3] = ["groq", "openai", "ollama"];

/// Embedding providers the factory knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 3] = ["ollama", "openai", "mock"];

/// Vector stores the factory knows how to build.
pub const KNOWN_VECTOR_STORES: [&str; 2] = ["weaviate", "memory"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .companion/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit JSON log lines
    pub json_logs: bool,

    /// Completion provider settings
    pub llm: LlmSettings,

    /// Embedding provider settings
    pub embedding: EmbeddingSettings,

    /// Vector store settings
    pub vector_store: VectorStoreSettings,

    /// HTTP server settings
    pub server: ServerSettings,

    /// Persona overrides
    pub persona: PersonaSettings,
}

/// Completion provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    pub model: String,

    #[serde(rename = "apiKeyEnv", default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(rename = "maxTokens", default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            endpoint: None,
            model: "llama3-70b-8192".to_string(),
            api_key_env: Some("GROQ_API_KEY".to_string()),
            timeout: default_timeout(),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    pub model: String,

    pub dimensions: usize,

    #[serde(rename = "apiKeyEnv", default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: None,
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            api_key_env: None,
            timeout: default_timeout(),
        }
    }
}

/// Vector store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreSettings {
    pub provider: String,

    pub endpoint: String,

    /// Collection holding the indexed documents
    #[serde(rename = "className")]
    pub class_name: String,

    #[serde(rename = "apiKeyEnv", default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Number of neighbours requested from the store
    #[serde(rename = "topK", default = "default_top_k")]
    pub top_k: usize,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// JSON file of `{text, url}` records loaded by the `memory` store
    #[serde(rename = "documentsFile", default, skip_serializing_if = "Option::is_none")]
    pub documents_file: Option<PathBuf>,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "weaviate".to_string(),
            endpoint: "http://localhost:8080".to_string(),
            class_name: "WebContent".to_string(),
            api_key_env: None,
            top_k: default_top_k(),
            timeout: default_timeout(),
            documents_file: None,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Optional overrides for the persona's canned content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greetings: Option<Vec<String>>,

    #[serde(rename = "supportivePhrases", default, skip_serializing_if = "Option::is_none")]
    pub supportive_phrases: Option<Vec<String>>,

    /// Prompt id under .companion/prompts/ replacing the built-in persona prompt
    #[serde(rename = "promptFile", default, skip_serializing_if = "Option::is_none")]
    pub prompt_file: Option<String>,
}

fn default_timeout() -> u64 {
    30
}

fn default_top_k() -> usize {
    1
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSettings>,
    embedding: Option<EmbeddingSettings>,
    #[serde(rename = "vectorStore")]
    vector_store: Option<VectorStoreSettings>,
    server: Option<ServerSettings>,
    persona: Option<PersonaSettings>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            json_logs: false,
            llm: LlmSettings::default(),
            embedding: EmbeddingSettings::default(),
            vector_store: VectorStoreSettings::default(),
            server: ServerSettings::default(),
            persona: PersonaSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML config file, and environment variables.
    ///
    /// Environment variables:
    /// - `COMPANION_WORKSPACE`: Override workspace path
    /// - `COMPANION_CONFIG`: Path to config file
    /// - `COMPANION_LLM_PROVIDER`: Completion provider
    /// - `COMPANION_MODEL`: Completion model identifier
    /// - `COMPANION_BIND`: HTTP bind address
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use companion_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Model: {}", config.llm.model);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration with an explicit workspace and/or config file.
    ///
    /// Explicit paths win over `COMPANION_WORKSPACE` and `COMPANION_CONFIG`.
    /// The file is merged before environment variables are applied, so the
    /// precedence stays defaults < file < env regardless of how the file
    /// was located.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_layered(workspace, config_file, |name| std::env::var(name).ok())
    }

    fn load_layered<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        env: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env("COMPANION_WORKSPACE").map(PathBuf::from)) {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env("COMPANION_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.companion_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Some(provider) = env("COMPANION_LLM_PROVIDER") {
            config.llm.provider = provider;
        }

        if let Some(model) = env("COMPANION_MODEL") {
            config.llm.model = model;
        }

        if let Some(bind) = env("COMPANION_BIND") {
            config.server.bind = bind;
        }

        if let Some(level) = env("RUST_LOG") {
            config.log_level = Some(level);
        }

        if env("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.clone().merge(config_file))
    }

    fn merge(mut self, file: ConfigFile) -> Self {
        if let Some(path) = file.workspace.and_then(|ws| ws.path) {
            self.workspace = PathBuf::from(path);
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
            if let Some(json) = logging.json {
                self.json_logs = json;
            }
        }

        if let Some(llm) = file.llm {
            self.llm = llm;
        }
        if let Some(embedding) = file.embedding {
            self.embedding = embedding;
        }
        if let Some(vector_store) = file.vector_store {
            self.vector_store = vector_store;
        }
        if let Some(server) = file.server {
            self.server = server;
        }
        if let Some(persona) = file.persona {
            self.persona = persona;
        }

        self
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        json_logs: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if json_logs {
            self.json_logs = true;
        }

        self
    }

    /// Get the path to the .companion directory.
    pub fn companion_dir(&self) -> PathBuf {
        self.workspace.join(".companion")
    }

    /// Resolve a secret from the environment variable named in config.
    pub fn resolve_secret(env_var: Option<&str>) -> Option<String> {
        env_var
            .and_then(|name| std::env::var(name).ok())
            .filter(|value| !value.trim().is_empty())
    }

    /// API key for the completion provider, if configured.
    pub fn llm_api_key(&self) -> Option<String> {
        Self::resolve_secret(self.llm.api_key_env.as_deref())
    }

    /// API key for the embedding provider, if configured.
    pub fn embedding_api_key(&self) -> Option<String> {
        Self::resolve_secret(self.embedding.api_key_env.as_deref())
    }

    /// API key for the vector store, if configured.
    pub fn vector_store_api_key(&self) -> Option<String> {
        Self::resolve_secret(self.vector_store.api_key_env.as_deref())
    }

    /// Validate provider names and persona overrides.
    pub fn validate(&self) -> AppResult<()> {
        check_known("LLM provider", &self.llm.provider, &KNOWN_LLM_PROVIDERS)?;
        check_known(
            "embedding provider",
            &self.embedding.provider,
            &KNOWN_EMBEDDING_PROVIDERS,
        )?;
        check_known(
            "vector store",
            &self.vector_store.provider,
            &KNOWN_VECTOR_STORES,
        )?;

        if self.vector_store.top_k == 0 {
            return Err(AppError::Config(
                "vectorStore.topK must be at least 1".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding.dimensions must be at least 1".to_string(),
            ));
        }

        if let Some(ref greetings) = self.persona.greetings {
            if greetings.is_empty() {
                return Err(AppError::Config(
                    "persona.greetings cannot be empty".to_string(),
                ));
            }
        }

        if let Some(ref phrases) = self.persona.supportive_phrases {
            if phrases.is_empty() {
                return Err(AppError::Config(
                    "persona.supportivePhrases cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn check_known(kind: &str, value: &str, known: &[&str]) -> AppResult<()> {
    if known.contains(&value.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "Unknown {}: {}. Supported: {}",
            kind,
            value,
            known.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm.provider, "groq");
        assert_eq!(config.llm.model, "llama3-70b-8192");
        assert_eq!(config.vector_store.class_name, "WebContent");
        assert_eq!(config.vector_store.top_k, 1);
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_companion_dir() {
        let config = AppConfig::default();
        assert!(config.companion_dir().ends_with(".companion"));
    }

    #[test]
    fn test_with_overrides() {
        let overridden = AppConfig::default().with_overrides(
            None,
            None,
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            false,
            true,
        );

        assert_eq!(overridden.llm.provider, "ollama");
        assert_eq!(overridden.llm.model, "llama3.2");
        assert!(overridden.verbose);
        assert!(overridden.json_logs);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            r#"
llm:
  provider: openai
  model: gpt-4o-mini
  apiKeyEnv: OPENAI_API_KEY
vectorStore:
  provider: weaviate
  endpoint: http://weaviate:8080
  className: Articles
  topK: 3
persona:
  greetings:
    - "Hey you!"
logging:
  level: debug
  color: false
"#,
        )
        .unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(merged.llm.provider, "openai");
        assert_eq!(merged.llm.timeout, 30);
        assert_eq!(merged.vector_store.class_name, "Articles");
        assert_eq!(merged.vector_store.top_k, 3);
        assert_eq!(merged.embedding.provider, "ollama");
        assert_eq!(
            merged.persona.greetings,
            Some(vec!["Hey you!".to_string()])
        );
        assert_eq!(merged.log_level, Some("debug".to_string()));
        assert!(merged.no_color);
    }

    fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| {
            vars.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    fn workspace_with_config(yaml: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".companion");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yaml"), yaml).unwrap();
        temp
    }

    #[test]
    fn test_env_overrides_file_with_explicit_workspace() {
        let temp = workspace_with_config("server:\n  bind: 127.0.0.1:3999\n");

        let config = AppConfig::load_layered(
            Some(temp.path().to_path_buf()),
            None,
            env_from(&[("COMPANION_BIND", "127.0.0.1:4555")]),
        )
        .unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:4555");
    }

    #[test]
    fn test_env_overrides_explicit_config_file() {
        let temp = workspace_with_config(
            "server:\n  bind: 127.0.0.1:3999\nllm:\n  provider: ollama\n  model: llama3\n",
        );
        let file = temp.path().join(".companion/config.yaml");

        let config = AppConfig::load_layered(
            Some(temp.path().to_path_buf()),
            Some(file),
            env_from(&[("COMPANION_MODEL", "mistral"), ("NO_COLOR", "1")]),
        )
        .unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:3999");
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model, "mistral");
        assert!(config.no_color);
    }

    #[test]
    fn test_workspace_from_env() {
        let temp = workspace_with_config("server:\n  bind: 0.0.0.0:8000\n");
        let workspace = temp.path().to_string_lossy().to_string();

        let config = AppConfig::load_layered(
            None,
            None,
            env_from(&[("COMPANION_WORKSPACE", workspace.as_str())]),
        )
        .unwrap();

        assert_eq!(config.workspace, temp.path());
        assert_eq!(config.server.bind, "0.0.0.0:8000");
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_layered(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("nope.yaml")),
            env_from(&[]),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_merge_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "llm: [unterminated").unwrap();

        let result = AppConfig::default().merge_yaml(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.llm.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_top_k() {
        let mut config = AppConfig::default();
        config.vector_store.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_persona_lists() {
        let mut config = AppConfig::default();
        config.persona.supportive_phrases = Some(Vec::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_secret_missing_var() {
        assert_eq!(
            AppConfig::resolve_secret(Some("COMPANION_TEST_SURELY_UNSET_VAR")),
            None
        );
        assert_eq!(AppConfig::resolve_secret(None), None);
    }
}
