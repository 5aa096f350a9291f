//! Agent selection bounds from TOML (`[selector]` section)

use council_domain::{ConfigIssue, ConfigIssueCode, SelectorLimits};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSelectorConfig {
    pub min_agents: usize,
    pub max_agents: usize,
    /// Team size before complexity adjustment
    pub base_agents: usize,
}

impl Default for FileSelectorConfig {
    fn default() -> Self {
        let limits = SelectorLimits::default();
        Self {
            min_agents: limits.min_agents,
            max_agents: limits.max_agents,
            base_agents: limits.base_agents,
        }
    }
}

impl FileSelectorConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.min_agents == 0 || self.min_agents > self.max_agents {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidRange {
                    field: "selector".to_string(),
                },
                format!(
                    "selector: expected 1 <= min_agents <= max_agents, got {} / {}",
                    self.min_agents, self.max_agents
                ),
            ));
        } else if !(self.min_agents..=self.max_agents).contains(&self.base_agents) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidRange {
                    field: "selector.base_agents".to_string(),
                },
                format!(
                    "selector.base_agents: {} is outside {}..={} and will be clamped",
                    self.base_agents, self.min_agents, self.max_agents
                ),
            ));
        }
        issues
    }

    pub fn to_limits(&self) -> SelectorLimits {
        let min_agents = self.min_agents.max(1);
        let max_agents = self.max_agents.max(min_agents);
        SelectorLimits {
            min_agents,
            max_agents,
            base_agents: self.base_agents.clamp(min_agents, max_agents),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_outside_bounds_is_clamped() {
        let config = FileSelectorConfig {
            base_agents: 20,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(!council_domain::has_errors(&issues));
        assert_eq!(config.to_limits().base_agents, 8);
    }

    #[test]
    fn test_zero_minimum_is_error() {
        let config = FileSelectorConfig {
            min_agents: 0,
            ..Default::default()
        };
        assert!(council_domain::has_errors(&config.validate()));
    }
}
