//! Objective analysis and multi-model synthesis.
//!
//! Every available model analyzes the objective independently. Each
//! response becomes an [`ObjectiveAnalysis`] (with a fixed fallback when it
//! doesn't parse) and [`Objective::synthesize`] folds them into the single
//! immutable [`Objective`] that drives the rest of the discussion.

use crate::agent::{AgentType, Complexity};
use crate::core::json::{extract_json_object, number_field, string_list};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const FALLBACK_COMPLEXITY: u8 = 5;

/// Estimated scope of the objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Small,
    Medium,
    Large,
}

impl Scope {
    pub fn as_str(&self) -> &str {
        match self {
            Scope::Small => "small",
            Scope::Medium => "medium",
            Scope::Large => "large",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" | "narrow" => Ok(Scope::Small),
            "medium" | "moderate" => Ok(Scope::Medium),
            "large" | "broad" | "wide" => Ok(Scope::Large),
            other => Err(format!("Unknown scope: {}", other)),
        }
    }
}

/// One model's reading of the objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveAnalysis {
    pub model: String,
    pub complexity: u8,
    pub required_capabilities: Vec<String>,
    pub suggested_agents: Vec<String>,
    pub scope: Scope,
    /// True when the response did not parse and defaults were used
    pub is_fallback: bool,
}

impl ObjectiveAnalysis {
    pub fn fallback(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            complexity: FALLBACK_COMPLEXITY,
            required_capabilities: Vec::new(),
            suggested_agents: Vec::new(),
            scope: Scope::Medium,
            is_fallback: true,
        }
    }

    /// Parse a structured analysis; any non-conforming response yields
    /// [`ObjectiveAnalysis::fallback`].
    pub fn parse(model: impl Into<String>, response: &str) -> Self {
        let model = model.into();
        let Some(value) = extract_json_object(response) else {
            return Self::fallback(model);
        };

        let complexity = number_field(&value, "complexity")
            .map(|c| c.round().clamp(1.0, 10.0) as u8)
            .unwrap_or(FALLBACK_COMPLEXITY);
        let scope = value
            .get("estimatedScope")
            .or_else(|| value.get("scope"))
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
            .unwrap_or(Scope::Medium);

        let mut required_capabilities = string_list(&value, "requiredCapabilities");
        required_capabilities.extend(string_list(&value, "required_capabilities"));
        let mut suggested_agents = string_list(&value, "suggestedAgents");
        suggested_agents.extend(string_list(&value, "suggested_agents"));

        Self {
            model,
            complexity,
            required_capabilities,
            suggested_agents,
            scope,
            is_fallback: false,
        }
    }
}

/// The discussion objective (immutable once synthesized)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub main_objective: String,
    pub complexity: u8,
    pub required_capabilities: Vec<String>,
    pub suggested_agents: Vec<String>,
    pub estimated_scope: Scope,
}

impl Objective {
    /// Objective with default analysis, used when no model could analyze it
    pub fn unanalyzed(main_objective: impl Into<String>, complexity_hint: Option<u8>) -> Self {
        Self {
            main_objective: main_objective.into(),
            complexity: complexity_hint
                .map(|c| c.clamp(1, 10))
                .unwrap_or(FALLBACK_COMPLEXITY),
            required_capabilities: Vec::new(),
            suggested_agents: Vec::new(),
            estimated_scope: Scope::Medium,
        }
    }

    /// Fold per-model analyses into one objective.
    ///
    /// complexity is the rounded mean, capability and agent lists are set
    /// unions (first-seen order), and scope is the widest any model reported.
    ///
    /// # Example
    ///
    /// ```
    /// use council_domain::objective::{Objective, ObjectiveAnalysis, Scope};
    ///
    /// let analyses = vec![
    ///     ObjectiveAnalysis::parse("a", r#"{"complexity": 8, "scope": "small"}"#),
    ///     ObjectiveAnalysis::parse("b", r#"{"complexity": 5, "scope": "large"}"#),
    /// ];
    /// let objective = Objective::synthesize("Design a cache", &analyses, None);
    /// assert_eq!(objective.complexity, 7);
    /// assert_eq!(objective.estimated_scope, Scope::Large);
    /// ```
    pub fn synthesize(
        main_objective: impl Into<String>,
        analyses: &[ObjectiveAnalysis],
        complexity_hint: Option<u8>,
    ) -> Self {
        let main_objective = main_objective.into();
        if analyses.is_empty() {
            return Self::unanalyzed(main_objective, complexity_hint);
        }

        let mean = analyses.iter().map(|a| a.complexity as f64).sum::<f64>() / analyses.len() as f64;
        let complexity = (mean.round() as u8).clamp(1, 10);

        let estimated_scope = if analyses.iter().any(|a| a.scope == Scope::Large) {
            Scope::Large
        } else if analyses.iter().any(|a| a.scope == Scope::Medium) {
            Scope::Medium
        } else {
            Scope::Small
        };

        Self {
            main_objective,
            complexity,
            required_capabilities: ordered_union(analyses.iter().map(|a| &a.required_capabilities)),
            suggested_agents: ordered_union(analyses.iter().map(|a| &a.suggested_agents)),
            estimated_scope,
        }
    }

    pub fn complexity_level(&self) -> Complexity {
        Complexity::from_score(self.complexity)
    }

    /// Suggested agents parsed into roles
    pub fn suggested_types(&self) -> Vec<AgentType> {
        self.suggested_agents
            .iter()
            .map(|s| {
                let Ok(agent_type) = s.parse::<AgentType>();
                agent_type
            })
            .collect()
    }
}

fn ordered_union<'a>(lists: impl Iterator<Item = &'a Vec<String>>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut merged = Vec::new();
    for item in lists.flatten() {
        let key = item.to_lowercase();
        if seen.insert(key) {
            merged.push(item.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured_analysis() {
        let response = r#"Here is my plan:
```json
{"complexity": 8, "requiredCapabilities": ["system_design", "security_review"],
 "suggestedAgents": ["architect", "security"], "estimatedScope": "large"}
```"#;
        let analysis = ObjectiveAnalysis::parse("model-a", response);
        assert!(!analysis.is_fallback);
        assert_eq!(analysis.complexity, 8);
        assert_eq!(analysis.scope, Scope::Large);
        assert_eq!(analysis.suggested_agents, vec!["architect", "security"]);
    }

    #[test]
    fn test_parse_failure_uses_fallback() {
        let analysis = ObjectiveAnalysis::parse("model-a", "This is a hard problem.");
        assert!(analysis.is_fallback);
        assert_eq!(analysis.complexity, 5);
        assert_eq!(analysis.scope, Scope::Medium);
    }

    #[test]
    fn test_complexity_is_clamped() {
        let analysis = ObjectiveAnalysis::parse("m", r#"{"complexity": 42}"#);
        assert_eq!(analysis.complexity, 10);
    }

    #[test]
    fn test_synthesize_rounds_mean_and_unions() {
        let analyses = vec![
            ObjectiveAnalysis::parse(
                "a",
                r#"{"complexity": 6, "requiredCapabilities": ["research"], "suggestedAgents": ["researcher"], "scope": "small"}"#,
            ),
            ObjectiveAnalysis::parse(
                "b",
                r#"{"complexity": 7, "requiredCapabilities": ["Research", "analysis"], "suggestedAgents": ["analyst"], "scope": "medium"}"#,
            ),
        ];
        let objective = Objective::synthesize("Plan a migration", &analyses, None);
        // mean 6.5 rounds away from zero
        assert_eq!(objective.complexity, 7);
        assert_eq!(objective.required_capabilities, vec!["research", "analysis"]);
        assert_eq!(objective.suggested_agents, vec!["researcher", "analyst"]);
        assert_eq!(objective.estimated_scope, Scope::Medium);
    }

    #[test]
    fn test_synthesize_all_small() {
        let analyses = vec![
            ObjectiveAnalysis::parse("a", r#"{"complexity": 2, "scope": "small"}"#),
            ObjectiveAnalysis::parse("b", r#"{"complexity": 3, "scope": "small"}"#),
        ];
        let objective = Objective::synthesize("Rename a field", &analyses, None);
        assert_eq!(objective.estimated_scope, Scope::Small);
        assert_eq!(objective.complexity_level(), Complexity::Low);
    }

    #[test]
    fn test_synthesize_without_analyses_uses_hint() {
        let objective = Objective::synthesize("Anything", &[], Some(9));
        assert_eq!(objective.complexity, 9);
        assert_eq!(objective.estimated_scope, Scope::Medium);
    }
}
