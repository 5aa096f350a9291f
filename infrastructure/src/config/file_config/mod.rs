//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into the application's
//! [`CouncilConfig`] once validated.

mod memory;
mod models;
mod orchestrator;
mod output;
mod providers;
mod rounds;
mod selector;
mod tiers;

pub use memory::FileMemoryConfig;
pub use models::{FileModelConfig, parse_catalog};
pub use orchestrator::FileOrchestratorConfig;
pub use output::FileOutputConfig;
pub use providers::{FileProviderEndpoint, FileProvidersConfig};
pub use rounds::FileRoundsConfig;
pub use selector::FileSelectorConfig;
pub use tiers::FileTiersConfig;

use council_application::CouncilConfig;
use council_domain::{ConfigIssue, Severity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("failed to read configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration:\n  {}", .0.join("\n  "))]
    Invalid(Vec<String>),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Discussion loop control
    pub orchestrator: FileOrchestratorConfig,
    /// Round bounds and depth
    pub rounds: FileRoundsConfig,
    /// Team size bounds
    pub selector: FileSelectorConfig,
    /// Model tier limits
    pub tiers: FileTiersConfig,
    /// Agent memory capacities and persistence
    pub memory: FileMemoryConfig,
    /// The oracle catalog
    pub models: Vec<FileModelConfig>,
    /// Endpoints and routing
    pub providers: FileProvidersConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.orchestrator.validate());
        issues.extend(self.rounds.validate());
        issues.extend(self.selector.validate());
        issues.extend(parse_catalog(&self.models).1);
        issues.extend(self.providers.validate());
        issues
    }

    /// Build the application configuration.
    ///
    /// Fails only on error-level issues; warnings are returned alongside so
    /// the caller can print them.
    pub fn to_council_config(&self) -> Result<(CouncilConfig, Vec<ConfigIssue>), ConfigValidationError> {
        let issues = self.validate();
        let errors: Vec<String> = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .map(|i| i.message.clone())
            .collect();
        if !errors.is_empty() {
            return Err(ConfigValidationError::Invalid(errors));
        }

        let config = CouncilConfig {
            orchestrator: self
                .orchestrator
                .to_params(self.tiers.newest_models.clone()),
            rounds: self.rounds.to_policy(),
            history_limit: self.rounds.history_limit.max(1),
            selector: self.selector.to_limits(),
            tiers: self.tiers.to_limits(),
            memory: self.memory.to_capacities(),
            models: parse_catalog(&self.models).0,
        };
        Ok((config, issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{DepthRequirement, OutputFormat};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[orchestrator]
max_iterations = 20
seed = 42

[rounds]
max_rounds = 8
depth_requirement = "deep"

[tiers]
newest_models = ["claude-sonnet-4.5"]

[[models]]
id = "claude-sonnet-4.5"
provider = "anthropic"
quality = 9.2
flags = ["latest"]

[[models]]
id = "gpt-5-mini"
provider = "openai"
cost_per_token = 0.0000004

[output]
format = "full"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.orchestrator.max_iterations, 20);
        assert_eq!(config.orchestrator.consensus_sample_size, 8);
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[1].quality, 5.0);
        assert_eq!(config.output.format, Some(OutputFormat::Full));

        let (council, issues) = config.to_council_config().unwrap();
        assert!(issues.is_empty());
        assert_eq!(council.orchestrator.seed, Some(42));
        assert_eq!(council.orchestrator.newest_models, vec!["claude-sonnet-4.5"]);
        assert_eq!(council.rounds.depth_requirement, DepthRequirement::Deep);
        assert_eq!(council.rounds.max_rounds, 8);
        assert_eq!(council.models.len(), 2);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert!(config.models.is_empty());
        assert!(config.output.color);
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(!council_domain::has_errors(&issues));
    }

    #[test]
    fn test_errors_block_conversion() {
        let config = FileConfig {
            rounds: FileRoundsConfig {
                min_rounds: 9,
                optimal_rounds: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.to_council_config().unwrap_err();
        assert!(matches!(err, ConfigValidationError::Invalid(ref e) if e.len() == 1));
        assert!(err.to_string().contains("min_rounds"));
    }
}
