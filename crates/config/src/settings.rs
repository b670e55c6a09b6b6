//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// In-memory stores allowed
    #[default]
    Development,
    /// Pre-release; persistence required
    Staging,
    /// Live traffic; persistence required
    Production,
}

impl RuntimeEnvironment {
    /// Staging and production require durable session and log storage
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Record search (services index)
    #[serde(default)]
    pub search: SearchConfig,

    /// Completion backend for the fallback path
    #[serde(default)]
    pub llm: LlmSettings,

    /// Session and chat-log persistence (ScyllaDB)
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Router behaviour
    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Optional YAML file overriding the built-in context vocabulary
    #[serde(default)]
    pub vocabulary_path: Option<String>,
}

/// Record search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// On-disk index directory (in RAM if None)
    #[serde(default)]
    pub index_path: Option<String>,

    /// YAML/JSON catalog loaded into the index at start-up
    #[serde(default)]
    pub catalog_path: Option<String>,

    /// Maximum records returned per search
    #[serde(default = "default_search_limit")]
    pub limit: usize,

    /// Index writer heap budget in bytes
    #[serde(default = "default_writer_memory")]
    pub writer_memory_bytes: usize,
}

fn default_search_limit() -> usize {
    3
}

fn default_writer_memory() -> usize {
    50_000_000
}

/// Tantivy refuses writer budgets below this
pub const MIN_WRITER_MEMORY_BYTES: usize = 15_000_000;

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_path: None,
            catalog_path: None,
            limit: default_search_limit(),
            writer_memory_bytes: default_writer_memory(),
        }
    }
}

/// Completion backend provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Ollama,
    OpenAI,
}

/// Completion backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub provider: LlmProvider,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// API key (required for remote OpenAI-compatible endpoints)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient (network/5xx) failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Override for the fallback system instruction
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_llm_model() -> String {
    "qwen3:4b-instruct-2507-q4_K_M".to_string()
}

fn default_llm_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_max_tokens() -> usize {
    512
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_llm_model(),
            endpoint: default_llm_endpoint(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            system_prompt: None,
        }
    }
}

/// Persistence configuration for ScyllaDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Enable ScyllaDB persistence (false = in-memory only)
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_scylla_hosts")]
    pub scylla_hosts: Vec<String>,

    #[serde(default = "default_scylla_keyspace")]
    pub keyspace: String,

    #[serde(default = "default_replication_factor")]
    pub replication_factor: u8,
}

fn default_scylla_hosts() -> Vec<String> {
    std::env::var("SCYLLA_HOSTS")
        .map(|s| s.split(',').map(|h| h.trim().to_string()).collect())
        .unwrap_or_else(|_| vec!["127.0.0.1:9042".to_string()])
}

fn default_scylla_keyspace() -> String {
    std::env::var("SCYLLA_KEYSPACE").unwrap_or_else(|_| "chat_router".to_string())
}

fn default_replication_factor() -> u8 {
    1
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            scylla_hosts: default_scylla_hosts(),
            keyspace: default_scylla_keyspace(),
            replication_factor: default_replication_factor(),
        }
    }
}

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// History messages handed to the fallback responder
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,

    /// Actor id logged for calls without a session
    #[serde(default = "default_anonymous_actor")]
    pub anonymous_actor: String,
}

fn default_max_history_turns() -> usize {
    10
}

fn default_anonymous_actor() -> String {
    "anonymous".to_string()
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_history_turns: default_max_history_turns(),
            anonymous_actor: default_anonymous_actor(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_search()?;
        self.validate_llm()?;
        self.validate_router()?;
        self.validate_persistence()?;
        Ok(())
    }

    fn validate_search(&self) -> Result<(), ConfigError> {
        if self.search.limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.limit".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.search.writer_memory_bytes < MIN_WRITER_MEMORY_BYTES {
            return Err(ConfigError::InvalidValue {
                field: "search.writer_memory_bytes".to_string(),
                message: format!(
                    "Must be at least {}, got {}",
                    MIN_WRITER_MEMORY_BYTES, self.search.writer_memory_bytes
                ),
            });
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if llm.model.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.model".to_string()));
        }

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            });
        }

        if !(0.0..=1.0).contains(&llm.top_p) {
            return Err(ConfigError::InvalidValue {
                field: "llm.top_p".to_string(),
                message: format!("Must be between 0.0 and 1.0, got {}", llm.top_p),
            });
        }

        let has_key = llm
            .api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false);
        let is_local = llm.endpoint.starts_with("http://localhost")
            || llm.endpoint.starts_with("http://127.0.0.1");
        if llm.provider == LlmProvider::OpenAI && !has_key && !is_local {
            return Err(ConfigError::MissingField("llm.api_key".to_string()));
        }

        Ok(())
    }

    fn validate_router(&self) -> Result<(), ConfigError> {
        if self.router.max_history_turns == 0 {
            return Err(ConfigError::InvalidValue {
                field: "router.max_history_turns".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.router.anonymous_actor.trim().is_empty() {
            return Err(ConfigError::MissingField("router.anonymous_actor".to_string()));
        }

        Ok(())
    }

    fn validate_persistence(&self) -> Result<(), ConfigError> {
        if !self.persistence.enabled {
            if self.environment.is_strict() {
                return Err(ConfigError::InvalidValue {
                    field: "persistence.enabled".to_string(),
                    message: format!("Must be enabled in {:?}", self.environment),
                });
            }
            return Ok(());
        }

        if self.persistence.scylla_hosts.is_empty() {
            return Err(ConfigError::MissingField(
                "persistence.scylla_hosts".to_string(),
            ));
        }

        let keyspace_ok = !self.persistence.keyspace.is_empty()
            && self
                .persistence
                .keyspace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !keyspace_ok {
            return Err(ConfigError::InvalidValue {
                field: "persistence.keyspace".to_string(),
                message: format!(
                    "Must be non-empty alphanumeric/underscore, got '{}'",
                    self.persistence.keyspace
                ),
            });
        }

        Ok(())
    }
}

/// Load settings from files and environment
///
/// Priority: env vars (`CHAT_ROUTER__SECTION__KEY`) > config/{env} > config/default > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from("config", env)
}

/// Same as [`load_settings`] with an explicit config directory
pub fn load_settings_from(dir: &str, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name(&format!("{}/default", dir)).required(false));

    if let Some(env_name) = env {
        builder = builder
            .add_source(File::with_name(&format!("{}/{}", dir, env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("CHAT_ROUTER")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.search.limit, 3);
        assert_eq!(settings.router.max_history_turns, 10);
        assert_eq!(settings.router.anonymous_actor, "anonymous");
        assert!(!settings.persistence.enabled);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_search_validation() {
        let mut settings = Settings::default();
        settings.search.limit = 0;
        assert!(settings.validate().is_err());

        settings.search.limit = 5;
        settings.search.writer_memory_bytes = 1_000;
        assert!(settings.validate().is_err());

        settings.search.writer_memory_bytes = MIN_WRITER_MEMORY_BYTES;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_openai_requires_key_for_remote_endpoint() {
        let mut settings = Settings::default();
        settings.llm.provider = LlmProvider::OpenAI;
        settings.llm.endpoint = "https://api.openai.com/v1".to_string();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::MissingField(field)) if field == "llm.api_key"
        ));

        settings.llm.api_key = Some("sk-test".to_string());
        assert!(settings.validate().is_ok());

        settings.llm.api_key = None;
        settings.llm.endpoint = "http://localhost:8000/v1".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_router_validation() {
        let mut settings = Settings::default();
        settings.router.max_history_turns = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_persistence_keyspace_validation() {
        let mut settings = Settings::default();
        settings.persistence.enabled = true;
        settings.persistence.keyspace = "bad-keyspace".to_string();
        assert!(settings.validate().is_err());

        settings.persistence.keyspace = "chat_router".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_settings_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "search:\n  limit: 5\nrouter:\n  max_history_turns: 4\nllm:\n  model: llama3"
        )
        .unwrap();

        let settings = load_settings_from(dir.path().to_str().unwrap(), None).unwrap();
        assert_eq!(settings.search.limit, 5);
        assert_eq!(settings.router.max_history_turns, 4);
        assert_eq!(settings.llm.model, "llama3");
        // untouched sections keep defaults
        assert_eq!(settings.llm.temperature, 0.7);
    }

    #[test]
    fn test_strict_environment_requires_persistence() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        assert!(settings.validate().is_err());

        settings.persistence.enabled = true;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_shipped_default_config_loads() {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config");
        let settings = load_settings_from(dir, None).unwrap();
        assert_eq!(settings.search.limit, 3);
        assert_eq!(settings.persistence.keyspace, "chat_router");
        assert!(!settings.persistence.enabled);
    }
}
