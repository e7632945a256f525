//! Configuration loading and validation for Pincer.
//!
//! Loads [`RuntimeConfig`] from `~/.pincer/config.toml` with environment
//! variable overrides, and validates every setting at load time so a bad
//! config fails before any network traffic.

use pincer_mcp::McpServerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.pincer/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Which endpoint and model the agent reasons against
    #[serde(default)]
    pub reasoner: ReasonerConfig,

    /// Agent identity and loop bounds
    #[serde(default)]
    pub agent: AgentConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Remote MCP tool servers, registered in order
    #[serde(default)]
    pub mcp_servers: Vec<McpServerConfig>,
}

/// `[reasoner]` — an OpenAI-compatible chat-completions endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct ReasonerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Left unset here, `PINCER_API_KEY` then `OPENAI_API_KEY` are consulted
    /// at load time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            api_key: None,
        }
    }
}

fn redact(secret: &Option<String>) -> &'static str {
    match secret {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for ReasonerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReasonerConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

/// `[agent]` — who the agent is and how long it may reason per turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Reasoning steps allowed per turn before a summary is forced
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_agent_name() -> String {
    "pincer".into()
}
fn default_system_prompt() -> String {
    "You are Pincer, a helpful assistant. Use the available tools when they help you answer precisely.".into()
}
fn default_max_iterations() -> usize {
    10
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            system_prompt: default_system_prompt(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// `[logging]` — tracing filter, overridable by `RUST_LOG`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive string, e.g. `"info"` or `"pincer=debug"`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the default path (`~/.pincer/config.toml`).
    ///
    /// Environment variables are consulted afterwards:
    /// - `PINCER_API_KEY`, then `OPENAI_API_KEY`, fill a missing API key
    /// - `PINCER_MODEL` overrides the model
    /// - `PINCER_BASE_URL` overrides the endpoint
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.reasoner.api_key.is_none() {
            config.reasoner.api_key = std::env::var("PINCER_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("PINCER_MODEL") {
            config.reasoner.model = model;
        }

        if let Ok(base_url) = std::env::var("PINCER_BASE_URL") {
            config.reasoner.base_url = base_url;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// A missing file is not an error; it yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".pincer")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.reasoner.temperature) {
            return Err(ConfigError::ValidationError(
                "reasoner.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "agent.name must not be empty".into(),
            ));
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }

        for server in &self.mcp_servers {
            if server.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "every [[mcp_servers]] entry needs a name".into(),
                ));
            }
            if server.url.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "mcp server '{}' needs a url",
                    server.name
                )));
            }
            if let (Some(allow), Some(deny)) = (&server.allow, &server.deny) {
                let overlap: Vec<&str> = allow
                    .iter()
                    .filter(|name| deny.contains(name))
                    .map(String::as_str)
                    .collect();
                if !overlap.is_empty() {
                    return Err(ConfigError::ValidationError(format!(
                        "mcp server '{}' lists {} in both allow and deny",
                        server.name,
                        overlap.join(", ")
                    )));
                }
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.reasoner.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            reasoner: ReasonerConfig::default(),
            agent: AgentConfig::default(),
            logging: LoggingConfig::default(),
            mcp_servers: vec![],
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
