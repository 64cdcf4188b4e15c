//! Provider router: selects the LLM provider named in config.
//!
//! A hosted provider with no API key is a configuration error raised here,
//! eagerly, instead of failing on the first LLM call.

use crate::openai_compat::OpenAiCompatProvider;
use scoutclaw_config::AppConfig;
use scoutclaw_core::error::Error;
use scoutclaw_core::provider::Provider;
use std::collections::HashMap;
use std::sync::Arc;

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }
}

/// Build providers from configuration.
///
/// Fails when the default provider needs an API key and none is configured.
pub fn build_from_config(config: &AppConfig) -> Result<ProviderRouter, Error> {
    let mut router = ProviderRouter::new(&config.default_provider);

    let mut names: Vec<&String> = config.providers.keys().collect();
    if !config.providers.contains_key(&config.default_provider) {
        names.push(&config.default_provider);
    }

    for name in names {
        let provider_config = config.providers.get(name);
        let api_key = provider_config
            .and_then(|p| p.api_key.clone())
            .or_else(|| config.api_key.clone());
        let base_url = provider_config
            .and_then(|p| p.api_url.clone())
            .unwrap_or_else(|| default_base_url(name));

        let api_key = match api_key {
            Some(key) => key,
            None if !requires_api_key(name) => "ollama".into(),
            None if name == &config.default_provider => {
                return Err(Error::Config {
                    message: format!(
                        "No API key configured for provider '{name}'. \
                         Set SCOUTCLAW_API_KEY or OPENAI_API_KEY, or add api_key to {}",
                        AppConfig::config_dir().join("config.toml").display()
                    ),
                });
            }
            None => {
                tracing::warn!(provider = %name, "Skipping provider without API key");
                continue;
            }
        };

        router.register(
            name.clone(),
            Arc::new(OpenAiCompatProvider::new(name.as_str(), base_url, api_key)),
        );
    }

    Ok(router)
}

/// Local runtimes accept any key.
fn requires_api_key(provider_name: &str) -> bool {
    !matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
