//! Next-action suggestions.
//!
//! A few models each suggest one action from a closed set of kinds; the
//! highest-priority suggestion wins, ties going to the first one seen.

use crate::core::json::{extract_json_object, number_field};
use serde::{Deserialize, Serialize};

pub const FALLBACK_PRIORITY: u8 = 5;

/// The closed set of round actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateAgent,
    AgentDiscussion,
    WebResearch,
    DeepAnalysis,
    RequirementGathering,
    SolutionDesign,
    ImplementationPlanning,
    RiskAssessment,
    IntegrationDesign,
    TestingStrategy,
    DeploymentPlanning,
    Other,
}

impl ActionKind {
    pub const ALL: [ActionKind; 12] = [
        ActionKind::CreateAgent,
        ActionKind::AgentDiscussion,
        ActionKind::WebResearch,
        ActionKind::DeepAnalysis,
        ActionKind::RequirementGathering,
        ActionKind::SolutionDesign,
        ActionKind::ImplementationPlanning,
        ActionKind::RiskAssessment,
        ActionKind::IntegrationDesign,
        ActionKind::TestingStrategy,
        ActionKind::DeploymentPlanning,
        ActionKind::Other,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::CreateAgent => "create_agent",
            ActionKind::AgentDiscussion => "agent_discussion",
            ActionKind::WebResearch => "web_research",
            ActionKind::DeepAnalysis => "deep_analysis",
            ActionKind::RequirementGathering => "requirement_gathering",
            ActionKind::SolutionDesign => "solution_design",
            ActionKind::ImplementationPlanning => "implementation_planning",
            ActionKind::RiskAssessment => "risk_assessment",
            ActionKind::IntegrationDesign => "integration_design",
            ActionKind::TestingStrategy => "testing_strategy",
            ActionKind::DeploymentPlanning => "deployment_planning",
            ActionKind::Other => "other",
        }
    }

    /// Human-readable description used in prompts
    pub fn description(&self) -> &str {
        match self {
            ActionKind::CreateAgent => "spawn specialized sub-agents",
            ActionKind::AgentDiscussion => "agents discuss the current focus",
            ActionKind::WebResearch => "search external knowledge sources",
            ActionKind::DeepAnalysis => "analyze risks and opportunities in depth",
            ActionKind::RequirementGathering => "clarify requirements",
            ActionKind::SolutionDesign => "design a solution",
            ActionKind::ImplementationPlanning => "plan the implementation",
            ActionKind::RiskAssessment => "assess risks",
            ActionKind::IntegrationDesign => "design integrations",
            ActionKind::TestingStrategy => "define a testing strategy",
            ActionKind::DeploymentPlanning => "plan deployment",
            ActionKind::Other => "any other useful step",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = std::convert::Infallible;

    /// Unknown kinds map to [`ActionKind::Other`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Ok(ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .unwrap_or(ActionKind::Other))
    }
}

/// One model's suggestion for the next action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSuggestion {
    pub kind: ActionKind,
    /// Priority 1-10
    pub priority: u8,
    pub rationale: String,
    /// Free-form details, e.g. a research query or the focus for discussion
    pub details: String,
    pub model: String,
}

impl ActionSuggestion {
    pub fn fallback(model: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::AgentDiscussion,
            priority: FALLBACK_PRIORITY,
            rationale: "No structured suggestion; continue the discussion".to_string(),
            details: String::new(),
            model: model.into(),
        }
    }

    /// Parse `{action, priority, rationale, details}`; falls back to a
    /// discussion at priority 5.
    pub fn parse(model: impl Into<String>, response: &str) -> Self {
        let model = model.into();
        let Some(value) = extract_json_object(response) else {
            return Self::fallback(model);
        };
        let Some(kind) = ["action", "type", "kind"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        else {
            return Self::fallback(model);
        };
        let Ok(kind) = kind.parse::<ActionKind>();

        let priority = number_field(&value, "priority")
            .map(|p| p.round().clamp(1.0, 10.0) as u8)
            .unwrap_or(FALLBACK_PRIORITY);
        let text = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        Self {
            kind,
            priority,
            rationale: text("rationale"),
            details: text("details"),
            model,
        }
    }
}

/// Highest priority wins; the first suggestion wins ties
pub fn select_action(suggestions: &[ActionSuggestion]) -> Option<&ActionSuggestion> {
    suggestions.iter().fold(None, |best, candidate| match best {
        Some(current) if current.priority >= candidate.priority => Some(current),
        _ => Some(candidate),
    })
}
