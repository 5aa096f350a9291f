//! Council configuration container.
//!
//! [`CouncilConfig`] groups every policy the orchestrator needs. The
//! infrastructure config loader builds it from file and environment
//! sources; tests build it directly.

use crate::config::OrchestratorParams;
use council_domain::round::record::DEFAULT_HISTORY_LIMIT;
use council_domain::{MemoryCapacities, ModelDescriptor, RoundPolicy, SelectorLimits, TierLimits};

#[derive(Debug, Clone)]
pub struct CouncilConfig {
    pub orchestrator: OrchestratorParams,
    pub rounds: RoundPolicy,
    pub history_limit: usize,
    pub selector: SelectorLimits,
    pub tiers: TierLimits,
    pub memory: MemoryCapacities,
    /// The oracle catalog
    pub models: Vec<ModelDescriptor>,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorParams::default(),
            rounds: RoundPolicy::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            selector: SelectorLimits::default(),
            tiers: TierLimits::default(),
            memory: MemoryCapacities::default(),
            models: Vec::new(),
        }
    }
}

impl CouncilConfig {
    pub fn with_models(mut self, models: Vec<ModelDescriptor>) -> Self {
        self.models = models;
        self
    }

    pub fn with_orchestrator(mut self, orchestrator: OrchestratorParams) -> Self {
        self.orchestrator = orchestrator;
        self
    }
}
