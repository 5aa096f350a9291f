//! Provider configuration from TOML (`[providers]` section)
//!
//! Every provider speaks the OpenAI-compatible chat completions protocol;
//! a provider is just an endpoint and where to find its key.
//!
//! ```toml
//! [providers]
//! default = "openai"
//!
//! [providers.openrouter]
//! base_url = "https://openrouter.ai/api/v1"
//! api_key_env = "OPENROUTER_API_KEY"
//!
//! [providers.routing]
//! "llama3.1:8b" = "ollama"
//! ```

use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One OpenAI-compatible endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderEndpoint {
    pub base_url: String,
    /// Environment variable holding the API key; `None` for keyless local servers
    pub api_key_env: Option<String>,
    /// Direct API key (not recommended, use `api_key_env` instead)
    pub api_key: Option<String>,
    pub max_tokens: u32,
}

impl Default for FileProviderEndpoint {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key_env: None,
            api_key: None,
            max_tokens: 4096,
        }
    }
}

impl FileProviderEndpoint {
    fn new(base_url: &str, api_key_env: Option<&str>) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key_env: api_key_env.map(str::to_string),
            ..Default::default()
        }
    }

    /// Resolve the key: direct value first, then the named variable
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Some(key.trim().to_string());
        }
        let var = self.api_key_env.as_deref()?;
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Keyless endpoints (local servers) are always usable
    pub fn requires_key(&self) -> bool {
        self.api_key_env.is_some() || self.api_key.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Provider used for models without a routing entry or a matching
    /// catalog provider
    pub default: Option<String>,
    /// Explicit model id → provider name overrides
    pub routing: BTreeMap<String, String>,
    /// Endpoints keyed by provider name
    #[serde(flatten)]
    pub endpoints: BTreeMap<String, FileProviderEndpoint>,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        let endpoints = BTreeMap::from([
            (
                "openai".to_string(),
                FileProviderEndpoint::new("https://api.openai.com/v1", Some("OPENAI_API_KEY")),
            ),
            (
                "anthropic".to_string(),
                FileProviderEndpoint::new("https://api.anthropic.com/v1", Some("ANTHROPIC_API_KEY")),
            ),
            (
                "ollama".to_string(),
                FileProviderEndpoint::new("http://localhost:11434/v1", None),
            ),
        ]);
        Self {
            default: None,
            routing: BTreeMap::new(),
            endpoints,
        }
    }
}

impl FileProvidersConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let known: Vec<String> = self.endpoints.keys().cloned().collect();

        let mut check = |field: String, provider: &str| {
            if !self.endpoints.contains_key(provider) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: field.clone(),
                        value: provider.to_string(),
                        valid_values: known.clone(),
                    },
                    format!("{field}: no endpoint configured for provider '{provider}'"),
                ));
            }
        };
        if let Some(default) = &self.default {
            check("providers.default".to_string(), default);
        }
        for (model, provider) in &self.routing {
            check(format!("providers.routing.{model}"), provider);
        }

        for (name, endpoint) in &self.endpoints {
            if !endpoint.base_url.starts_with("http://") && !endpoint.base_url.starts_with("https://") {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidRange {
                        field: format!("providers.{name}.base_url"),
                    },
                    format!(
                        "providers.{name}.base_url: '{}' is not an http(s) URL",
                        endpoint.base_url
                    ),
                ));
            }
        }
        issues
    }
}
