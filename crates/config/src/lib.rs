//! Configuration loading, validation, and management for ScoutClaw.
//!
//! Loads configuration from `~/.scoutclaw/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.scoutclaw/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Session history for the HTTP surface
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    800
}
fn default_true() -> bool {
    true
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("agent", &self.agent)
            .field("tools", &self.tools)
            .field("gateway", &self.gateway)
            .field("sessions", &self.sessions)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Hard ceiling on loop iterations per run
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Try the search-then-answer shortcut for factual tasks
    #[serde(default = "default_true")]
    pub auto_preflight: bool,

    /// Tools whose successful result is returned as the final answer
    #[serde(default = "default_fast_exit_tools")]
    pub fast_exit_tools: Vec<String>,

    /// Result count for the preflight search
    #[serde(default = "default_preflight_search_k")]
    pub preflight_search_k: u32,

    /// Maximum pages read during preflight
    #[serde(default = "default_preflight_max_reads")]
    pub preflight_max_reads: usize,
}

fn default_max_steps() -> usize {
    5
}
fn default_fast_exit_tools() -> Vec<String> {
    vec!["memory_get".into(), "memory_set".into()]
}
fn default_preflight_search_k() -> u32 {
    5
}
fn default_preflight_max_reads() -> usize {
    3
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            auto_preflight: true,
            fast_exit_tools: default_fast_exit_tools(),
            preflight_search_k: default_preflight_search_k(),
            preflight_max_reads: default_preflight_max_reads(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Model used by `novelty_check`
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Similarity at or above which a topic counts as already covered
    #[serde(default = "default_novelty_threshold")]
    pub novelty_threshold: f32,

    /// Timeout for outbound HTTP made by tools
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_novelty_threshold() -> f32 {
    0.75
}
fn default_http_timeout_secs() -> u64 {
    25
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            embedding_model: default_embedding_model(),
            novelty_threshold: default_novelty_threshold(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Step budget for runs started over HTTP
    #[serde(default = "default_gateway_max_steps")]
    pub max_steps: usize,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_gateway_max_steps() -> usize {
    8
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            max_steps: default_gateway_max_steps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory holding one JSONL log per session (defaults to `~/.scoutclaw/sessions`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// How many previous turns are prepended to a task
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

fn default_history_turns() -> usize {
    6
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            history_turns: default_history_turns(),
        }
    }
}

impl SessionsConfig {
    /// The configured directory, or the default under the config dir.
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("sessions"))
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.scoutclaw/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `SCOUTCLAW_API_KEY` (highest priority)
    /// - `OPENAI_API_KEY`
    /// - `OPENROUTER_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
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

    /// Apply environment overrides through `lookup` (injectable for tests).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = non_empty("SCOUTCLAW_API_KEY")
                .or_else(|| non_empty("OPENAI_API_KEY"))
                .or_else(|| non_empty("OPENROUTER_API_KEY"));
        }

        if let Some(provider) = non_empty("SCOUTCLAW_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = non_empty("SCOUTCLAW_MODEL") {
            self.default_model = model;
        }

        if let Some(host) = non_empty("OLLAMA_HOST") {
            let entry = self.providers.entry("ollama".into()).or_insert(ProviderConfig {
                api_key: None,
                api_url: None,
                default_model: None,
            });
            if entry.api_url.is_none() {
                entry.api_url = Some(format!("{}/v1", host.trim_end_matches('/')));
            }
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".scoutclaw")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_steps == 0 || self.gateway.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "max_steps must be at least 1".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.tools.novelty_threshold) {
            return Err(ConfigError::ValidationError(
                "novelty_threshold must be between 0.0 and 1.0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            agent: AgentConfig::default(),
            tools: ToolsConfig::default(),
            gateway: GatewayConfig::default(),
            sessions: SessionsConfig::default(),
            providers: HashMap::new(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.agent.max_steps, 5);
        assert_eq!(config.gateway.max_steps, 8);
        assert!(config.agent.auto_preflight);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.agent.fast_exit_tools, config.agent.fast_exit_tools);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.default_temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_steps_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_steps = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_steps"));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.default_model, "gpt-4o-mini");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "default_provider = \"ollama\"\n[agent]\nmax_steps = 3\nauto_preflight = false\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_provider, "ollama");
        assert_eq!(config.agent.max_steps, 3);
        assert!(!config.agent.auto_preflight);
        assert_eq!(config.agent.fast_exit_tools, vec!["memory_get", "memory_set"]);
        assert_eq!(config.tools.http_timeout_secs, 25);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_provider = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply_in_priority_order() {
        let mut config = AppConfig::default();
        config.apply_env(|key| match key {
            "OPENAI_API_KEY" => Some("sk-openai".into()),
            "OPENROUTER_API_KEY" => Some("sk-or".into()),
            "SCOUTCLAW_MODEL" => Some("gpt-4o".into()),
            "OLLAMA_HOST" => Some("http://gpu-box:11434/".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(
            config.providers["ollama"].api_url.as_deref(),
            Some("http://gpu-box:11434/v1")
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("default_model"));
        assert!(toml_str.contains("[agent]"));
    }
}
