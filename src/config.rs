//! Configuration management for LawAid
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{LawaidError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Upper bound on chunks handed to the prompt per turn
pub const MAX_TOP_K: usize = 4;

/// Main configuration structure for LawAid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Language-model provider configuration
    pub provider: ProviderConfig,
    /// Embedding endpoint configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Vector index location and retrieval settings
    #[serde(default)]
    pub index: IndexConfig,
    /// Chat turn settings (sampling, memory, disclaimer)
    #[serde(default)]
    pub chat: ChatConfig,
    /// HTTP surface settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Provider configuration
///
/// Specifies which completion API to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use ("together" or "ollama")
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Together AI configuration
    #[serde(default)]
    pub together: TogetherConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// Together AI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TogetherConfig {
    /// Completion model
    #[serde(default = "default_together_model")]
    pub model: String,

    /// API base URL; tests point this at a mock server
    #[serde(default = "default_together_api_base")]
    pub api_base: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// HTTP timeout for completion and embedding calls (seconds)
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_together_model() -> String {
    "mistralai/Mistral-7B-Instruct-v0.2".to_string()
}

fn default_together_api_base() -> String {
    "https://api.together.xyz".to_string()
}

fn default_api_key_env() -> String {
    "TOGETHER_AI".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for TogetherConfig {
    fn default() -> Self {
        Self {
            model: default_together_model(),
            api_base: default_together_api_base(),
            api_key_env: default_api_key_env(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

impl TogetherConfig {
    /// Read the API key from the configured environment variable
    ///
    /// There is no fallback value: a missing or blank variable is an error.
    ///
    /// # Errors
    ///
    /// Returns `LawaidError::MissingCredentials` if the variable is unset or empty
    pub fn resolve_api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(LawaidError::MissingCredentials(format!(
                "together (set the {} environment variable)",
                self.api_key_env
            ))
            .into()),
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// HTTP timeout for generate and embed calls (seconds)
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "mistral:7b-instruct".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

/// Embedding endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Type of embedding endpoint ("together" or "ollama")
    #[serde(rename = "type", default = "default_embedding_type")]
    pub provider_type: String,

    /// Together embedding model (shares api_base and key with `provider.together`)
    #[serde(default = "default_together_embedding_model")]
    pub together_model: String,

    /// Ollama embedding model (uses `provider.ollama.host`)
    #[serde(default = "default_ollama_embedding_model")]
    pub ollama_model: String,

    /// Vector length of the embedding model, when known
    ///
    /// When set, a persisted index of another size is rejected at startup.
    #[serde(default)]
    pub dimensions: Option<usize>,
}

fn default_embedding_type() -> String {
    "together".to_string()
}

fn default_together_embedding_model() -> String {
    "togethercomputer/m2-bert-80M-8k-retrieval".to_string()
}

fn default_ollama_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider_type: default_embedding_type(),
            together_model: default_together_embedding_model(),
            ollama_model: default_ollama_embedding_model(),
            dimensions: None,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding the persisted index
    #[serde(default = "default_index_path")]
    pub path: PathBuf,

    /// Number of chunks retrieved per question (1..=4)
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Text used to seed a fresh index when none exists
    #[serde(default = "default_seed_text")]
    pub seed_text: String,
}

fn default_index_path() -> PathBuf {
    PathBuf::from("faiss_index")
}

fn default_top_k() -> usize {
    MAX_TOP_K
}

fn default_seed_text() -> String {
    "sample legal document".to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: default_index_path(),
            top_k: default_top_k(),
            seed_text: default_seed_text(),
        }
    }
}

/// Chat turn configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Sampling temperature passed to the model
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum completion tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Number of exchanges retained in conversation memory
    #[serde(default = "default_memory_window")]
    pub memory_window: usize,

    /// Text prefixed to every answer shown to the user
    #[serde(default = "default_disclaimer")]
    pub disclaimer: String,
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_memory_window() -> usize {
    2
}

fn default_disclaimer() -> String {
    "⚠ *Note: Information provided may be inaccurate.* \n\n\n".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            memory_window: default_memory_window(),
            disclaimer: default_disclaimer(),
        }
    }
}

/// HTTP surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server binds to
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                provider_type: "together".to_string(),
                together: TogetherConfig::default(),
                ollama: OllamaConfig::default(),
            },
            embedding: EmbeddingConfig::default(),
            index: IndexConfig::default(),
            chat: ChatConfig::default(),
            server: ServerConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LawaidError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| LawaidError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("LAWAID_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("LAWAID_TOGETHER_MODEL") {
            self.provider.together.model = model;
        }

        if let Ok(api_base) = std::env::var("LAWAID_TOGETHER_API_BASE") {
            self.provider.together.api_base = api_base;
        }

        if let Ok(ollama_host) = std::env::var("LAWAID_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("LAWAID_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }

        if let Ok(embedding_type) = std::env::var("LAWAID_EMBEDDING_PROVIDER") {
            self.embedding.provider_type = embedding_type;
        }

        if let Ok(index_path) = std::env::var("LAWAID_INDEX_PATH") {
            tracing::debug!(index_path = %index_path, "Env override: LAWAID_INDEX_PATH");
            self.index.path = PathBuf::from(index_path);
        }

        if let Ok(top_k) = std::env::var("LAWAID_TOP_K") {
            if let Ok(value) = top_k.parse() {
                self.index.top_k = value;
            } else {
                tracing::warn!("Invalid LAWAID_TOP_K: {}", top_k);
            }
        }

        if let Ok(temperature) = std::env::var("LAWAID_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                self.chat.temperature = value;
            } else {
                tracing::warn!("Invalid LAWAID_TEMPERATURE: {}", temperature);
            }
        }

        if let Ok(max_tokens) = std::env::var("LAWAID_MAX_TOKENS") {
            if let Ok(value) = max_tokens.parse() {
                self.chat.max_tokens = value;
            } else {
                tracing::warn!("Invalid LAWAID_MAX_TOKENS: {}", max_tokens);
            }
        }

        if let Ok(bind) = std::env::var("LAWAID_BIND") {
            self.server.bind = bind;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        match &cli.command {
            crate::cli::Commands::Chat {
                provider: Some(provider),
            } => {
                self.provider.provider_type = provider.clone();
            }
            crate::cli::Commands::Serve { provider, bind } => {
                if let Some(provider) = provider {
                    self.provider.provider_type = provider.clone();
                }
                if let Some(bind) = bind {
                    self.server.bind = bind.clone();
                }
            }
            _ => {}
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set. Credentials are not
    /// checked here; they are resolved when the provider is built.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let valid_providers = ["together", "ollama"];

        if self.provider.provider_type.is_empty() {
            return Err(LawaidError::Config("Provider type cannot be empty".to_string()).into());
        }

        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(LawaidError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if !valid_providers.contains(&self.embedding.provider_type.as_str()) {
            return Err(LawaidError::Config(format!(
                "Invalid embedding type: {}. Must be one of: {}",
                self.embedding.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.index.top_k == 0 || self.index.top_k > MAX_TOP_K {
            return Err(LawaidError::Config(format!(
                "index.top_k must be between 1 and {}",
                MAX_TOP_K
            ))
            .into());
        }

        if self.index.seed_text.trim().is_empty() {
            return Err(
                LawaidError::Config("index.seed_text cannot be empty".to_string()).into(),
            );
        }

        if self.chat.memory_window == 0 {
            return Err(LawaidError::Config(
                "chat.memory_window must be greater than 0".to_string(),
            )
            .into());
        }

        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err(LawaidError::Config(
                "chat.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if self.chat.max_tokens == 0 {
            return Err(
                LawaidError::Config("chat.max_tokens must be greater than 0".to_string()).into(),
            );
        }

        if self.provider.together.timeout_seconds == 0 {
            return Err(LawaidError::Config(
                "provider.together.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.provider.ollama.timeout_seconds == 0 {
            return Err(LawaidError::Config(
                "provider.ollama.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.embedding.dimensions == Some(0) {
            return Err(LawaidError::Config(
                "embedding.dimensions must be greater than 0".to_string(),
            )
            .into());
        }

        self.bind_addr()?;

        Ok(())
    }

    /// Parse the configured server bind address
    ///
    /// # Errors
    ///
    /// Returns error if `server.bind` is not a socket address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server.bind.parse().map_err(|e| {
            LawaidError::Config(format!("Invalid server.bind '{}': {}", self.server.bind, e))
                .into()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
