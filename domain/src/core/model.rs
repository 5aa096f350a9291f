//! Model descriptor value object
//!
//! A [`ModelDescriptor`] describes one model offered by the oracle catalog.
//! The core only reads descriptors; it never mutates the catalog.

use serde::{Deserialize, Serialize};

/// Flags that mark a model as the provider's current top offering.
const FLAGSHIP_MARKERS: &[&str] = &["newest", "latest", "flagship"];

/// A model offered by the oracle catalog (Value Object)
///
/// # Example
///
/// ```
/// use council_domain::ModelDescriptor;
///
/// let model = ModelDescriptor::new("gpt-5-mini", "openai")
///     .with_quality(8.0)
///     .with_speed(9.5)
///     .with_cost(2.5e-7);
///
/// assert_eq!(model.name, "gpt-5-mini");
/// assert!(!model.is_flagship());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Identifier sent to the oracle (e.g. "claude-sonnet-4.5")
    pub id: String,
    /// Human-readable name; defaults to the id
    pub name: String,
    /// Provider name (e.g. "anthropic", "openai", "ollama")
    pub provider: String,
    /// Quality score on a 0-10+ scale
    pub quality_score: f64,
    /// Speed score on a 0-10 scale
    pub speed_score: f64,
    /// Cost per token in USD (0.0 for free models)
    pub cost_per_token: f64,
    /// Free-form flags such as "newest", "latest", "flagship", "reasoning"
    #[serde(default)]
    pub flags: Vec<String>,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>, provider: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            provider: provider.into(),
            quality_score: 5.0,
            speed_score: 5.0,
            cost_per_token: 0.0,
            flags: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality_score = quality;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed_score = speed;
        self
    }

    pub fn with_cost(mut self, cost_per_token: f64) -> Self {
        self.cost_per_token = cost_per_token;
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    /// Check whether the descriptor carries a flag (case-insensitive)
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f.eq_ignore_ascii_case(flag))
    }

    /// Newest / latest / flagship marked models
    pub fn is_flagship(&self) -> bool {
        FLAGSHIP_MARKERS.iter().any(|m| self.has_flag(m))
    }

    /// Whether the name or id contains any of the given markers (lowercased)
    pub fn name_matches(&self, markers: &[&str]) -> bool {
        let name = self.name.to_lowercase();
        let id = self.id.to_lowercase();
        markers.iter().any(|m| name.contains(m) || id.contains(m))
    }

    /// Estimated cost for a number of tokens
    pub fn estimate_cost(&self, tokens: u64) -> f64 {
        self.cost_per_token * tokens as f64
    }

    /// Check that the descriptor is usable
    pub fn validate(&self) -> Result<(), crate::DomainError> {
        if self.id.trim().is_empty() {
            return Err(crate::DomainError::InvalidModel(
                "model id cannot be empty".to_string(),
            ));
        }
        if self.provider.trim().is_empty() {
            return Err(crate::DomainError::InvalidModel(format!(
                "model '{}' has no provider",
                self.id
            )));
        }
        if self.cost_per_token < 0.0 || !self.cost_per_token.is_finite() {
            return Err(crate::DomainError::InvalidModel(format!(
                "model '{}' has an invalid cost",
                self.id
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flagship_detection() {
        let model = ModelDescriptor::new("claude-opus-4.5", "anthropic").with_flag("Flagship");
        assert!(model.is_flagship());
        assert!(!ModelDescriptor::new("x", "y").is_flagship());
    }

    #[test]
    fn test_name_matches_checks_id_and_name() {
        let model = ModelDescriptor::new("gemini-flash", "google").with_name("Gemini Fast");
        assert!(model.name_matches(&["flash"]));
        assert!(model.name_matches(&["fast"]));
        assert!(!model.name_matches(&["haiku"]));
    }

    #[test]
    fn test_validate() {
        assert!(ModelDescriptor::new("m", "p").validate().is_ok());
        assert!(ModelDescriptor::new(" ", "p").validate().is_err());
        assert!(ModelDescriptor::new("m", "").validate().is_err());
        assert!(ModelDescriptor::new("m", "p").with_cost(-1.0).validate().is_err());
    }

    #[test]
    fn test_deserialize_without_flags() {
        let json = r#"{"id":"m","name":"M","provider":"p","quality_score":9.0,"speed_score":7.0,"cost_per_token":0.000001}"#;
        let model: ModelDescriptor = serde_json::from_str(json).unwrap();
        assert!(model.flags.is_empty());
        assert_eq!(model.quality_score, 9.0);
    }
}
