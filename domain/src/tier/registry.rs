//! Model assignment registry with load balancing.
//!
//! The registry owns the assignment table: usage counts are derived from
//! active assignments, so a pick and its bookkeeping happen in one
//! `&mut self` call. Callers sharing a registry across tasks wrap it in a
//! mutex to keep the concurrency caps intact.

use super::scoring::tier_for_agent;
use super::{ModelTier, TierRoster};
use crate::agent::{Agent, AgentId, Complexity};
use crate::core::model::ModelDescriptor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Concurrency caps and tier classification inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierLimits {
    pub max_concurrent_per_model: usize,
    pub max_concurrent_premium: usize,
    pub free_providers: Vec<String>,
}

impl Default for TierLimits {
    fn default() -> Self {
        Self {
            max_concurrent_per_model: 3,
            max_concurrent_premium: 2,
            free_providers: vec!["ollama".to_string()],
        }
    }
}

/// Binding of a model to an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAssignment {
    pub agent_id: AgentId,
    pub model_id: String,
    pub tier: ModelTier,
    pub active: bool,
}

/// Active assignment counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierStats {
    pub per_tier: BTreeMap<ModelTier, usize>,
    pub per_model: BTreeMap<String, usize>,
    pub active: usize,
    pub released: usize,
}

pub struct ModelRegistry {
    catalog: Vec<ModelDescriptor>,
    roster: TierRoster,
    limits: TierLimits,
    assignments: Vec<ModelAssignment>,
    rng: StdRng,
}

impl ModelRegistry {
    pub fn new(catalog: Vec<ModelDescriptor>, limits: TierLimits) -> Self {
        Self::with_rng(catalog, limits, StdRng::from_os_rng())
    }

    /// Registry with a seeded rotation source for reproducible picks
    pub fn with_seed(catalog: Vec<ModelDescriptor>, limits: TierLimits, seed: u64) -> Self {
        Self::with_rng(catalog, limits, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(catalog: Vec<ModelDescriptor>, limits: TierLimits, rng: StdRng) -> Self {
        let roster = TierRoster::classify(&catalog, &limits.free_providers);
        Self {
            catalog,
            roster,
            limits,
            assignments: Vec::new(),
            rng,
        }
    }

    pub fn catalog(&self) -> &[ModelDescriptor] {
        &self.catalog
    }

    pub fn roster(&self) -> &TierRoster {
        &self.roster
    }

    pub fn limits(&self) -> &TierLimits {
        &self.limits
    }

    /// Current active assignments of a model
    pub fn usage(&self, model_id: &str) -> usize {
        self.active().filter(|a| a.model_id == model_id).count()
    }

    fn is_premium(&self, model_id: &str) -> bool {
        self.roster.primary_tier(model_id) == Some(ModelTier::Premium)
    }

    /// Active assignments holding a premium model, whichever tier picked it
    pub fn premium_usage(&self) -> usize {
        self.active()
            .filter(|a| a.tier == ModelTier::Premium || self.is_premium(&a.model_id))
            .count()
    }

    fn active(&self) -> impl Iterator<Item = &ModelAssignment> {
        self.assignments.iter().filter(|a| a.active)
    }

    /// Active assignment of an agent, if any
    pub fn assignment_for(&self, agent_id: &AgentId) -> Option<&ModelAssignment> {
        self.active().find(|a| &a.agent_id == agent_id)
    }

    /// Assign a model to an agent.
    ///
    /// Any previous active assignment of the agent is released first. The
    /// requested tier cascades downward, then upward; when every tier is
    /// capped the least-used model of the whole catalog is returned. Only an
    /// empty catalog yields `None`.
    pub fn assign(&mut self, agent: &Agent, complexity: Complexity) -> Option<ModelAssignment> {
        self.release(&agent.id);
        let requested = tier_for_agent(agent, complexity);

        let picked = requested
            .cascade()
            .into_iter()
            .find_map(|tier| self.pick_in_tier(tier).map(|id| (id, tier)))
            .or_else(|| self.least_used_overall());

        let (model_id, tier) = picked?;
        let assignment = ModelAssignment {
            agent_id: agent.id.clone(),
            model_id,
            tier,
            active: true,
        };
        self.assignments.push(assignment.clone());
        Some(assignment)
    }

    fn pick_in_tier(&mut self, tier: ModelTier) -> Option<String> {
        let premium_full = self.premium_usage() >= self.limits.max_concurrent_premium;
        if tier == ModelTier::Premium && premium_full {
            return None;
        }

        // Premium models listed in lower tiers count against the premium cap
        let mut candidates: Vec<(usize, f64, String)> = self
            .roster
            .models(tier)
            .iter()
            .filter(|m| !(premium_full && self.is_premium(&m.id)))
            .map(|m| (self.usage(&m.id), m.quality_score, m.id.clone()))
            .filter(|(usage, _, _)| *usage < self.limits.max_concurrent_per_model)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.total_cmp(&a.1)));

        let index = rotation_index(self.rng.random::<f64>(), candidates.len());
        Some(candidates.swap_remove(index).2)
    }

    fn least_used_overall(&self) -> Option<(String, ModelTier)> {
        let model = self
            .catalog
            .iter()
            .min_by_key(|m| self.usage(&m.id))?;
        let tier = self
            .roster
            .primary_tier(&model.id)
            .unwrap_or(ModelTier::Economical);
        Some((model.id.clone(), tier))
    }

    /// Mark an agent's active assignment inactive. Returns whether one existed.
    pub fn release(&mut self, agent_id: &AgentId) -> bool {
        let mut released = false;
        for assignment in self
            .assignments
            .iter_mut()
            .filter(|a| a.active && &a.agent_id == agent_id)
        {
            assignment.active = false;
            released = true;
        }
        released
    }

    pub fn release_all(&mut self) -> usize {
        let mut count = 0;
        for assignment in self.assignments.iter_mut().filter(|a| a.active) {
            assignment.active = false;
            count += 1;
        }
        count
    }

    pub fn stats(&self) -> TierStats {
        let mut stats = TierStats::default();
        for assignment in &self.assignments {
            if assignment.active {
                stats.active += 1;
                *stats.per_tier.entry(assignment.tier).or_default() += 1;
                *stats
                    .per_model
                    .entry(assignment.model_id.clone())
                    .or_default() += 1;
            } else {
                stats.released += 1;
            }
        }
        stats
    }
}

/// 20%: third-ranked, next 20%: second-ranked, otherwise the top candidate.
fn rotation_index(roll: f64, candidates: usize) -> usize {
    if roll < 0.2 && candidates >= 3 {
        2
    } else if roll < 0.4 && candidates >= 2 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentType;

    fn catalog() -> Vec<ModelDescriptor> {
        vec![
            ModelDescriptor::new("opus", "anthropic")
                .with_quality(10.0)
                .with_cost(1.5e-5)
                .with_flag("flagship"),
            ModelDescriptor::new("sonnet", "anthropic")
                .with_quality(9.0)
                .with_cost(3e-6),
            ModelDescriptor::new("haiku", "anthropic")
                .with_quality(7.0)
                .with_speed(9.5)
                .with_cost(1e-6),
        ]
    }

    fn agent(id: &str, agent_type: AgentType) -> Agent {
        Agent::main(AgentId::new(id), agent_type, "")
    }

    fn limits(per_model: usize, premium: usize) -> TierLimits {
        TierLimits {
            max_concurrent_per_model: per_model,
            max_concurrent_premium: premium,
            free_providers: Vec::new(),
        }
    }

    #[test]
    fn test_rotation_index() {
        assert_eq!(rotation_index(0.1, 3), 2);
        assert_eq!(rotation_index(0.1, 2), 1);
        assert_eq!(rotation_index(0.3, 3), 1);
        assert_eq!(rotation_index(0.3, 1), 0);
        assert_eq!(rotation_index(0.9, 3), 0);
    }

    #[test]
    fn test_assigns_requested_tier() {
        let mut registry = ModelRegistry::with_seed(catalog(), limits(3, 2), 7);
        let a = registry
            .assign(&agent("architect-1", AgentType::Architect), Complexity::Medium)
            .unwrap();
        assert_eq!(a.model_id, "opus");
        assert_eq!(a.tier, ModelTier::Premium);
    }

    #[test]
    fn test_premium_cap_cascades_down() {
        let mut registry = ModelRegistry::with_seed(catalog(), limits(3, 1), 7);
        registry.assign(&agent("c-1", AgentType::Coordinator), Complexity::Medium);
        let second = registry
            .assign(&agent("a-1", AgentType::Architect), Complexity::Medium)
            .unwrap();
        assert_eq!(second.model_id, "sonnet");
        assert_eq!(second.tier, ModelTier::Balanced);
    }

    #[test]
    fn test_premium_cap_holds_across_lower_tiers() {
        let catalog = vec![
            ModelDescriptor::new("llama-latest", "ollama")
                .with_quality(10.0)
                .with_flag("latest"),
            ModelDescriptor::new("llama-small", "ollama").with_quality(5.0),
        ];
        let limits = TierLimits {
            max_concurrent_per_model: 5,
            max_concurrent_premium: 1,
            free_providers: vec!["ollama".to_string()],
        };
        let mut registry = ModelRegistry::with_seed(catalog, limits, 11);
        assert!(registry.roster().ids(ModelTier::Economical).contains(&"llama-latest"));

        let first = registry
            .assign(&agent("c-1", AgentType::Coordinator), Complexity::High)
            .unwrap();
        assert_eq!(first.model_id, "llama-latest");
        assert_eq!(first.tier, ModelTier::Premium);

        let second = registry
            .assign(&agent("c-2", AgentType::Coordinator), Complexity::High)
            .unwrap();
        assert_eq!(second.model_id, "llama-small");
        assert_eq!(registry.usage("llama-latest"), 1);
        assert_eq!(registry.premium_usage(), 1);
    }

    #[test]
    fn test_per_model_cap_and_catalog_fallback() {
        let mut registry = ModelRegistry::with_seed(catalog(), limits(1, 1), 3);
        let ids: Vec<String> = (0..4)
            .map(|i| {
                registry
                    .assign(&agent(&format!("c-{i}"), AgentType::Coordinator), Complexity::High)
                    .unwrap()
                    .model_id
            })
            .collect();
        // One per model until every tier is capped, then least-used overall
        assert_eq!(&ids[..3], &["opus", "sonnet", "haiku"]);
        assert!(catalog().iter().any(|m| m.id == ids[3]));
        assert_eq!(registry.stats().active, 4);
    }

    #[test]
    fn test_empty_catalog_returns_none() {
        let mut registry = ModelRegistry::with_seed(Vec::new(), TierLimits::default(), 1);
        assert!(
            registry
                .assign(&agent("h-1", AgentType::Helper), Complexity::Low)
                .is_none()
        );
    }

    #[test]
    fn test_release_frees_capacity() {
        let mut registry = ModelRegistry::with_seed(catalog(), limits(1, 1), 9);
        let first = agent("c-1", AgentType::Coordinator);
        registry.assign(&first, Complexity::High);
        assert_eq!(registry.usage("opus"), 1);
        assert!(registry.release(&first.id));
        assert_eq!(registry.usage("opus"), 0);
        let again = registry
            .assign(&agent("c-2", AgentType::Coordinator), Complexity::High)
            .unwrap();
        assert_eq!(again.model_id, "opus");
        let stats = registry.stats();
        assert_eq!(stats.active, 1);
        assert_eq!(stats.released, 1);
    }

    #[test]
    fn test_reassign_releases_previous() {
        let mut registry = ModelRegistry::with_seed(catalog(), limits(3, 2), 5);
        let qa = agent("qa-1", AgentType::Qa);
        registry.assign(&qa, Complexity::Low);
        registry.assign(&qa, Complexity::Low);
        assert_eq!(registry.stats().active, 1);
        assert_eq!(registry.assignment_for(&qa.id).unwrap().tier, ModelTier::Fast);
    }

    #[test]
    fn test_seeded_picks_are_reproducible() {
        let many: Vec<ModelDescriptor> = (0..5)
            .map(|i| {
                ModelDescriptor::new(format!("m{i}"), "p")
                    .with_quality(9.0)
                    .with_cost(1e-6)
            })
            .collect();
        let run = |seed| {
            let mut registry = ModelRegistry::with_seed(many.clone(), limits(10, 2), seed);
            (0..6)
                .map(|i| {
                    registry
                        .assign(&agent(&format!("d-{i}"), AgentType::Developer), Complexity::Medium)
                        .unwrap()
                        .model_id
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }
}
