//! Sub-agent specifications requested from a parent agent.
//!
//! The parent asks the oracle for 1-3 specialists. When the response does
//! not parse, [`default_sub_agent_specs`] supplies a static set keyed by
//! the parent's role.

use super::entities::AgentType;
use crate::core::json::{extract_json_array, extract_json_object};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MAX_SUB_AGENTS: usize = 3;

/// A specialist the parent wants to spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAgentSpec {
    pub agent_type: AgentType,
    pub specialization: String,
    pub purpose: String,
}

impl SubAgentSpec {
    pub fn new(
        agent_type: AgentType,
        specialization: impl Into<String>,
        purpose: impl Into<String>,
    ) -> Self {
        Self {
            agent_type,
            specialization: specialization.into(),
            purpose: purpose.into(),
        }
    }

    /// Text used for capability and complexity inference
    pub fn descriptor_text(&self) -> String {
        format!("{} {}", self.specialization, self.purpose)
    }
}

/// Parse 1-3 specs from a response; `None` when nothing usable is found.
///
/// Accepts either a bare array or an object with a `subAgents` /
/// `sub_agents` / `agents` array.
pub fn parse_sub_agent_specs(response: &str) -> Option<Vec<SubAgentSpec>> {
    let items = match extract_json_object(response) {
        Some(obj) => ["subAgents", "sub_agents", "agents"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_array).cloned()),
        None => None,
    }
    .or_else(|| extract_json_array(response).and_then(|v| v.as_array().cloned()))?;

    let specs: Vec<SubAgentSpec> = items
        .iter()
        .filter_map(spec_from_value)
        .take(MAX_SUB_AGENTS)
        .collect();

    (!specs.is_empty()).then_some(specs)
}

fn spec_from_value(value: &Value) -> Option<SubAgentSpec> {
    let agent_type = value
        .get("type")
        .or_else(|| value.get("agentType"))
        .and_then(Value::as_str)?;
    if agent_type.trim().is_empty() {
        return None;
    }
    let specialization = value
        .get("specialization")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let purpose = value
        .get("purpose")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let Ok(agent_type) = agent_type.parse::<AgentType>();
    Some(SubAgentSpec::new(agent_type, specialization, purpose))
}

/// Static fallback specialists per parent role
pub fn default_sub_agent_specs(parent: &AgentType) -> Vec<SubAgentSpec> {
    use AgentType::*;

    let specs: &[(&str, &str, &str)] = match parent {
        Coordinator => &[
            ("analyst", "progress tracking", "Track open questions and decisions"),
            ("researcher", "background research", "Gather supporting facts"),
        ],
        Architect => &[
            ("developer", "component prototyping", "Validate design choices in code"),
            ("security", "threat modeling", "Review the design for weaknesses"),
        ],
        Researcher => &[
            ("analyst", "source evaluation", "Assess the reliability of findings"),
            ("helper", "literature summarizing", "Condense long sources"),
        ],
        Analyst => &[
            ("data_scientist", "quantitative modeling", "Quantify trade-offs"),
            ("helper", "data collection", "Assemble figures for analysis"),
        ],
        Developer => &[
            ("qa", "test design", "Design tests for the implementation"),
            ("documentation", "api reference", "Document interfaces"),
        ],
        Qa => &[("helper", "test data preparation", "Prepare fixtures and edge cases")],
        Security => &[("analyst", "compliance review", "Map findings to compliance needs")],
        Designer => &[("researcher", "user research", "Collect user needs")],
        Strategist => &[("analyst", "market analysis", "Size the opportunity")],
        DataScientist => &[("developer", "data pipeline", "Build the data pipeline")],
        Documentation | Helper | Custom(_) => &[(
            "helper",
            "general support",
            "Assist the parent agent with supporting tasks",
        )],
    };

    specs
        .iter()
        .map(|(t, s, p)| {
            let Ok(agent_type) = t.parse::<AgentType>();
            SubAgentSpec::new(agent_type, *s, *p)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_form() {
        let response = r#"{"subAgents": [
            {"type": "security", "specialization": "auth flows", "purpose": "Review login"},
            {"type": "helper", "specialization": "notes", "purpose": "Take notes"}
        ]}"#;
        let specs = parse_sub_agent_specs(response).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].agent_type, AgentType::Security);
        assert_eq!(specs[0].specialization, "auth flows");
    }

    #[test]
    fn test_parse_array_form_caps_at_three() {
        let response = r#"[{"type":"a"},{"type":"b"},{"type":"c"},{"type":"d"}]"#;
        let specs = parse_sub_agent_specs(response).unwrap();
        assert_eq!(specs.len(), MAX_SUB_AGENTS);
    }

    #[test]
    fn test_parse_failure_returns_none() {
        assert!(parse_sub_agent_specs("I would create a tester.").is_none());
        assert!(parse_sub_agent_specs(r#"{"subAgents": []}"#).is_none());
    }

    #[test]
    fn test_defaults_exist_for_every_parent() {
        for parent in [
            AgentType::Coordinator,
            AgentType::Developer,
            AgentType::Custom("x".to_string()),
        ] {
            let specs = default_sub_agent_specs(&parent);
            assert!(!specs.is_empty());
            assert!(specs.len() <= MAX_SUB_AGENTS);
        }
    }
}
