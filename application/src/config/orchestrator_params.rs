//! Orchestrator parameters: discussion loop control.
//!
//! [`OrchestratorParams`] groups the static parameters that control the
//! discussion loop in
//! [`ConversationOrchestrator`](crate::use_cases::run_discussion::ConversationOrchestrator).
//! These are application-layer concerns, not domain policy.

use council_domain::StopPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How much of the loop a discussion runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscussionMode {
    /// Full loop until the council votes to stop
    #[default]
    Autonomous,
    /// At most [`QUICK_MODE_ITERATIONS`] iterations
    Quick,
}

pub const QUICK_MODE_ITERATIONS: u32 = 3;

impl DiscussionMode {
    pub fn as_str(&self) -> &str {
        match self {
            DiscussionMode::Autonomous => "autonomous",
            DiscussionMode::Quick => "quick",
        }
    }
}

impl std::fmt::Display for DiscussionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DiscussionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "autonomous" | "auto" | "full" => Ok(DiscussionMode::Autonomous),
            "quick" | "fast" => Ok(DiscussionMode::Quick),
            other => Err(format!("unknown discussion mode: {other}")),
        }
    }
}

/// Discussion loop control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorParams {
    /// Hard ceiling on loop iterations
    pub max_iterations: u32,
    /// Models polled for continuation votes
    pub consensus_sample_size: usize,
    /// Models asked to suggest the next action
    pub action_sample_size: usize,
    pub continue_threshold: f64,
    pub completion_threshold: f64,
    /// Per-call oracle timeout
    pub oracle_timeout: Duration,
    /// Seed for the model rotation generator; `None` seeds from the OS
    pub seed: Option<u64>,
    /// Model ids sampled first for consensus votes
    pub newest_models: Vec<String>,
    /// Results requested from the knowledge search per query
    pub research_results: usize,
}

impl Default for OrchestratorParams {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            consensus_sample_size: 8,
            action_sample_size: 3,
            continue_threshold: 0.6,
            completion_threshold: 85.0,
            oracle_timeout: Duration::from_secs(45),
            seed: None,
            newest_models: Vec::new(),
            research_results: 5,
        }
    }
}

impl OrchestratorParams {
    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    pub fn with_newest_models(mut self, ids: Vec<String>) -> Self {
        self.newest_models = ids;
        self
    }

    /// Iteration ceiling after applying the mode
    pub fn iteration_limit(&self, mode: DiscussionMode) -> u32 {
        match mode {
            DiscussionMode::Autonomous => self.max_iterations,
            DiscussionMode::Quick => self.max_iterations.min(QUICK_MODE_ITERATIONS),
        }
    }

    /// Stop rule for the continuation vote.
    ///
    /// The ceiling comes from `max_iterations` regardless of mode; quick mode
    /// only shortens the loop itself.
    pub fn stop_policy(&self) -> StopPolicy {
        StopPolicy {
            continue_threshold: self.continue_threshold,
            completion_threshold: self.completion_threshold,
            max_iterations: self.max_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = OrchestratorParams::default();
        assert_eq!(params.max_iterations, 100);
        assert_eq!(params.consensus_sample_size, 8);
        assert_eq!(params.action_sample_size, 3);
        assert_eq!(params.oracle_timeout, Duration::from_secs(45));
        assert!(params.seed.is_none());
    }

    #[test]
    fn test_quick_mode_caps_iterations() {
        let params = OrchestratorParams::default();
        assert_eq!(params.iteration_limit(DiscussionMode::Quick), 3);
        assert_eq!(params.stop_policy().max_iterations, 100);
        let tiny = params.with_max_iterations(2);
        assert_eq!(tiny.iteration_limit(DiscussionMode::Quick), 2);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Quick".parse::<DiscussionMode>(), Ok(DiscussionMode::Quick));
        assert!("turbo".parse::<DiscussionMode>().is_err());
    }
}
