//! Shared model-assignment registry.
//!
//! The assignment table is the one piece of state agents compete for. A
//! [`SharedModelRegistry`] serializes every read-then-write on it behind a
//! mutex so the per-model and premium caps hold under concurrent callers.

use council_domain::{
    Agent, AgentId, Complexity, ModelAssignment, ModelDescriptor, ModelRegistry, TierRoster,
    TierStats,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

#[derive(Clone)]
pub struct SharedModelRegistry {
    inner: Arc<Mutex<ModelRegistry>>,
}

impl SharedModelRegistry {
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ModelRegistry> {
        // A panic while holding the lock leaves the table itself consistent
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Bind a model to the agent; `None` only when the catalog is empty
    pub fn assign(&self, agent: &Agent, complexity: Complexity) -> Option<ModelAssignment> {
        let assignment = self.lock().assign(agent, complexity);
        if assignment.is_none() {
            warn!("No model available for agent {}", agent.id);
        }
        assignment
    }

    pub fn release(&self, agent_id: &AgentId) -> bool {
        self.lock().release(agent_id)
    }

    pub fn release_all(&self) -> usize {
        self.lock().release_all()
    }

    pub fn usage(&self, model_id: &str) -> usize {
        self.lock().usage(model_id)
    }

    pub fn stats(&self) -> TierStats {
        self.lock().stats()
    }

    pub fn catalog(&self) -> Vec<ModelDescriptor> {
        self.lock().catalog().to_vec()
    }

    pub fn roster(&self) -> TierRoster {
        self.lock().roster().clone()
    }
}
