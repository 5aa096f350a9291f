//! Tier assignment limits from TOML (`[tiers]` section)

use council_domain::TierLimits;
use serde::{Deserialize, Serialize};

/// Raw tier settings
///
/// ```toml
/// [tiers]
/// max_concurrent_per_model = 3
/// max_concurrent_premium = 2
/// newest_models = ["claude-opus-4.5", "gpt-5.2"]
/// free_providers = ["ollama", "lmstudio"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTiersConfig {
    pub max_concurrent_per_model: usize,
    pub max_concurrent_premium: usize,
    /// Model ids sampled first for continuation votes
    pub newest_models: Vec<String>,
    /// Providers whose models count as economical regardless of price
    pub free_providers: Vec<String>,
}

impl Default for FileTiersConfig {
    fn default() -> Self {
        let limits = TierLimits::default();
        Self {
            max_concurrent_per_model: limits.max_concurrent_per_model,
            max_concurrent_premium: limits.max_concurrent_premium,
            newest_models: Vec::new(),
            free_providers: limits.free_providers,
        }
    }
}

impl FileTiersConfig {
    pub fn to_limits(&self) -> TierLimits {
        TierLimits {
            max_concurrent_per_model: self.max_concurrent_per_model.max(1),
            max_concurrent_premium: self.max_concurrent_premium,
            free_providers: self
                .free_providers
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }
}
