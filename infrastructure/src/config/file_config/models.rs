//! Oracle catalog from TOML (`[[models]]` array)

use council_domain::{ConfigIssue, ConfigIssueCode, ModelDescriptor};
use serde::{Deserialize, Serialize};

/// One catalog entry
///
/// # Example
///
/// ```toml
/// [[models]]
/// id = "claude-sonnet-4.5"
/// provider = "anthropic"
/// quality = 9.2
/// speed = 7.0
/// cost_per_token = 0.000003
/// flags = ["latest"]
///
/// [[models]]
/// id = "llama3.1:8b"
/// provider = "ollama"
/// quality = 6.0
/// speed = 8.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileModelConfig {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub provider: String,
    #[serde(default = "default_score")]
    pub quality: f64,
    #[serde(default = "default_score")]
    pub speed: f64,
    #[serde(default)]
    pub cost_per_token: f64,
    #[serde(default)]
    pub flags: Vec<String>,
}

fn default_score() -> f64 {
    5.0
}

impl FileModelConfig {
    pub fn to_descriptor(&self) -> ModelDescriptor {
        let mut descriptor = ModelDescriptor::new(self.id.trim(), self.provider.trim().to_lowercase())
            .with_quality(self.quality)
            .with_speed(self.speed)
            .with_cost(self.cost_per_token);
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            descriptor = descriptor.with_name(name.trim());
        }
        for flag in &self.flags {
            descriptor = descriptor.with_flag(flag.trim());
        }
        descriptor
    }
}

/// Convert the catalog, reporting invalid entries as errors and duplicates
/// as warnings. Only valid, first-seen entries are returned.
pub fn parse_catalog(models: &[FileModelConfig]) -> (Vec<ModelDescriptor>, Vec<ConfigIssue>) {
    let mut issues = Vec::new();
    let mut catalog: Vec<ModelDescriptor> = Vec::new();

    for entry in models {
        let descriptor = entry.to_descriptor();
        if let Err(e) = descriptor.validate() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidModel {
                    id: entry.id.clone(),
                },
                format!("models: {e}"),
            ));
            continue;
        }
        if catalog.iter().any(|m| m.id == descriptor.id) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidModel {
                    id: entry.id.clone(),
                },
                format!("models: duplicate id '{}' ignored", entry.id),
            ));
            continue;
        }
        catalog.push(descriptor);
    }

    if models.is_empty() {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::NoModels,
            "no [[models]] configured; the catalog will be requested from the providers",
        ));
    }

    (catalog, issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, provider: &str) -> FileModelConfig {
        FileModelConfig {
            id: id.to_string(),
            name: None,
            provider: provider.to_string(),
            quality: 8.0,
            speed: 6.0,
            cost_per_token: 0.0,
            flags: vec!["latest".to_string()],
        }
    }

    #[test]
    fn test_to_descriptor() {
        let descriptor = entry("gpt-5", "OpenAI").to_descriptor();
        assert_eq!(descriptor.name, "gpt-5");
        assert_eq!(descriptor.provider, "openai");
        assert_eq!(descriptor.quality_score, 8.0);
        assert!(descriptor.is_flagship());
    }

    #[test]
    fn test_parse_catalog_reports_problems() {
        let models = vec![entry("gpt-5", "openai"), entry("gpt-5", "openai"), entry("", "openai")];
        let (catalog, issues) = parse_catalog(&models);
        assert_eq!(catalog.len(), 1);
        assert_eq!(issues.len(), 2);
        assert!(council_domain::has_errors(&issues));
    }

    #[test]
    fn test_empty_catalog_is_a_warning() {
        let (catalog, issues) = parse_catalog(&[]);
        assert!(catalog.is_empty());
        assert_eq!(issues[0].code, ConfigIssueCode::NoModels);
        assert!(!council_domain::has_errors(&issues));
    }
}
