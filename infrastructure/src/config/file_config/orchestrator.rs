//! Discussion loop configuration from TOML (`[orchestrator]` section)

use council_application::OrchestratorParams;
use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw discussion loop settings
///
/// # Example
///
/// ```toml
/// [orchestrator]
/// max_iterations = 40
/// consensus_sample_size = 5
/// continue_threshold = 0.6
/// completion_threshold = 85
/// oracle_timeout_secs = 60
/// seed = 42                  # reproducible model rotation
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestratorConfig {
    pub max_iterations: u32,
    pub consensus_sample_size: usize,
    pub action_sample_size: usize,
    /// Weighted continue ratio below which the council stops
    pub continue_threshold: f64,
    /// Average completion percentage at which the council stops
    pub completion_threshold: f64,
    pub oracle_timeout_secs: u64,
    pub seed: Option<u64>,
    /// Search results requested per research action
    pub research_results: usize,
}

impl Default for FileOrchestratorConfig {
    fn default() -> Self {
        let params = OrchestratorParams::default();
        Self {
            max_iterations: params.max_iterations,
            consensus_sample_size: params.consensus_sample_size,
            action_sample_size: params.action_sample_size,
            continue_threshold: params.continue_threshold,
            completion_threshold: params.completion_threshold,
            oracle_timeout_secs: params.oracle_timeout.as_secs(),
            seed: None,
            research_results: params.research_results,
        }
    }
}

impl FileOrchestratorConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_iterations == 0 {
            issues.push(range_error(
                "orchestrator.max_iterations",
                "must be at least 1",
            ));
        }
        if self.consensus_sample_size == 0 || self.action_sample_size == 0 {
            issues.push(range_error(
                "orchestrator.sample_size",
                "consensus_sample_size and action_sample_size must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.continue_threshold) {
            issues.push(range_error(
                "orchestrator.continue_threshold",
                "must be between 0.0 and 1.0",
            ));
        }
        if !(0.0..=100.0).contains(&self.completion_threshold) {
            issues.push(range_error(
                "orchestrator.completion_threshold",
                "must be a percentage between 0 and 100",
            ));
        }
        if self.oracle_timeout_secs == 0 {
            issues.push(range_error(
                "orchestrator.oracle_timeout_secs",
                "must be at least 1 second",
            ));
        }
        issues
    }

    /// Build loop parameters; newest model ids come from the `[tiers]` section
    pub fn to_params(&self, newest_models: Vec<String>) -> OrchestratorParams {
        let mut params = OrchestratorParams::default()
            .with_max_iterations(self.max_iterations.max(1))
            .with_oracle_timeout(Duration::from_secs(self.oracle_timeout_secs.max(1)))
            .with_newest_models(newest_models);
        params.consensus_sample_size = self.consensus_sample_size.max(1);
        params.action_sample_size = self.action_sample_size.max(1);
        params.continue_threshold = self.continue_threshold.clamp(0.0, 1.0);
        params.completion_threshold = self.completion_threshold.clamp(0.0, 100.0);
        params.research_results = self.research_results;
        params.seed = self.seed;
        params
    }
}

fn range_error(field: &str, detail: &str) -> ConfigIssue {
    ConfigIssue::error(
        ConfigIssueCode::InvalidRange {
            field: field.to_string(),
        },
        format!("{field}: {detail}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_params() {
        let config = FileOrchestratorConfig::default();
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.oracle_timeout_secs, 45);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_to_params() {
        let config = FileOrchestratorConfig {
            max_iterations: 12,
            seed: Some(9),
            ..Default::default()
        };
        let params = config.to_params(vec!["gpt-5".to_string()]);
        assert_eq!(params.max_iterations, 12);
        assert_eq!(params.seed, Some(9));
        assert_eq!(params.newest_models, vec!["gpt-5"]);
    }

    #[test]
    fn test_out_of_range_thresholds() {
        let config = FileOrchestratorConfig {
            continue_threshold: 1.5,
            completion_threshold: -1.0,
            ..Default::default()
        };
        assert_eq!(config.validate().len(), 2);
    }
}
