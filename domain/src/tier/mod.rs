//! Tiered model selection.
//!
//! Models from the oracle catalog are classified into four tiers by static
//! predicates ([`ModelTier::qualifies`]). Agents are mapped to a tier by
//! role ([`scoring::tier_for_agent`]) and [`registry::ModelRegistry`]
//! binds a concrete model under concurrency limits.

pub mod registry;
pub mod scoring;

pub use registry::{ModelAssignment, ModelRegistry, TierLimits, TierStats};
pub use scoring::{dynamic_tier_score, static_tier, tier_for_agent, tier_for_score};

use crate::core::model::ModelDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const FAST_NAME_MARKERS: &[&str] = &["mini", "flash", "haiku", "nano", "fast"];

/// Quality/cost/speed bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Premium,
    Balanced,
    Fast,
    Economical,
}

impl ModelTier {
    /// All tiers, highest first
    pub const ALL: [ModelTier; 4] = [
        ModelTier::Premium,
        ModelTier::Balanced,
        ModelTier::Fast,
        ModelTier::Economical,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ModelTier::Premium => "premium",
            ModelTier::Balanced => "balanced",
            ModelTier::Fast => "fast",
            ModelTier::Economical => "economical",
        }
    }

    /// Whether a descriptor satisfies this tier's predicate
    pub fn qualifies(&self, model: &ModelDescriptor, free_providers: &[String]) -> bool {
        match self {
            ModelTier::Premium => model.quality_score >= 10.0 && model.is_flagship(),
            ModelTier::Balanced => {
                (8.0..10.0).contains(&model.quality_score) && model.cost_per_token <= 5e-6
            }
            ModelTier::Fast => model.speed_score >= 9.0 && model.name_matches(FAST_NAME_MARKERS),
            ModelTier::Economical => {
                model.cost_per_token <= 5e-7
                    || model.cost_per_token == 0.0
                    || free_providers
                        .iter()
                        .any(|p| p.eq_ignore_ascii_case(&model.provider))
            }
        }
    }

    /// Tiers to try for a request: the tier itself and everything below,
    /// then the tiers above from nearest to farthest.
    pub fn cascade(&self) -> Vec<ModelTier> {
        let index = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        let mut order: Vec<ModelTier> = Self::ALL[index..].to_vec();
        order.extend(Self::ALL[..index].iter().rev());
        order
    }
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

impl std::str::FromStr for ModelTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "premium" => Ok(ModelTier::Premium),
            "balanced" => Ok(ModelTier::Balanced),
            "fast" => Ok(ModelTier::Fast),
            "economical" | "economy" => Ok(ModelTier::Economical),
            other => Err(format!("Unknown tier: {}", other)),
        }
    }
}

/// Catalog classified into tiers. A model may qualify for several tiers.
#[derive(Debug, Clone, Default)]
pub struct TierRoster {
    members: BTreeMap<ModelTier, Vec<ModelDescriptor>>,
}

impl TierRoster {
    pub fn classify(catalog: &[ModelDescriptor], free_providers: &[String]) -> Self {
        let members = ModelTier::ALL
            .iter()
            .map(|tier| {
                let models = catalog
                    .iter()
                    .filter(|m| tier.qualifies(m, free_providers))
                    .cloned()
                    .collect();
                (*tier, models)
            })
            .collect();
        Self { members }
    }

    pub fn models(&self, tier: ModelTier) -> &[ModelDescriptor] {
        self.members.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Highest tier a model belongs to, if any
    pub fn primary_tier(&self, model_id: &str) -> Option<ModelTier> {
        ModelTier::ALL
            .into_iter()
            .find(|tier| self.models(*tier).iter().any(|m| m.id == model_id))
    }

    /// Ids of models in a tier
    pub fn ids(&self, tier: ModelTier) -> Vec<&str> {
        self.models(tier).iter().map(|m| m.id.as_str()).collect()
    }
}
