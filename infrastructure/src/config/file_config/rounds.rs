//! Round policy configuration from TOML (`[rounds]` section)

use council_domain::round::record::DEFAULT_HISTORY_LIMIT;
use council_domain::{ConfigIssue, ConfigIssueCode, DepthRequirement, RoundPolicy};
use serde::{Deserialize, Serialize};

/// Raw round bounds
///
/// ```toml
/// [rounds]
/// min_rounds = 2
/// optimal_rounds = 5
/// max_rounds = 8
/// depth_requirement = "deep"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoundsConfig {
    pub min_rounds: u32,
    pub optimal_rounds: u32,
    pub max_rounds: u32,
    /// "shallow", "medium" or "deep"
    pub depth_requirement: String,
    /// Round records kept for redundancy checks
    pub history_limit: usize,
}

impl Default for FileRoundsConfig {
    fn default() -> Self {
        let policy = RoundPolicy::default();
        Self {
            min_rounds: policy.min_rounds,
            optimal_rounds: policy.optimal_rounds,
            max_rounds: policy.max_rounds,
            depth_requirement: policy.depth_requirement.as_str().to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl FileRoundsConfig {
    /// Parse the depth requirement, falling back to medium with a warning
    pub fn parse_depth(&self) -> (DepthRequirement, Vec<ConfigIssue>) {
        match self.depth_requirement.parse() {
            Ok(depth) => (depth, Vec::new()),
            Err(_) => (
                DepthRequirement::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "rounds.depth_requirement".to_string(),
                        value: self.depth_requirement.clone(),
                        valid_values: vec![
                            "shallow".to_string(),
                            "medium".to_string(),
                            "deep".to_string(),
                        ],
                    },
                    format!(
                        "rounds.depth_requirement: unknown value '{}', falling back to 'medium'",
                        self.depth_requirement
                    ),
                )],
            ),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_depth().1;
        if self.max_rounds == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidRange {
                    field: "rounds.max_rounds".to_string(),
                },
                "rounds.max_rounds: must be at least 1",
            ));
        } else if self.min_rounds > self.optimal_rounds || self.optimal_rounds > self.max_rounds {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidRange {
                    field: "rounds".to_string(),
                },
                format!(
                    "rounds: expected min_rounds <= optimal_rounds <= max_rounds, got {} / {} / {}",
                    self.min_rounds, self.optimal_rounds, self.max_rounds
                ),
            ));
        }
        issues
    }

    pub fn to_policy(&self) -> RoundPolicy {
        RoundPolicy {
            min_rounds: self.min_rounds,
            optimal_rounds: self.optimal_rounds,
            max_rounds: self.max_rounds.max(1),
            depth_requirement: self.parse_depth().0,
        }
    }
}
