//! Agent domain entities

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Unique identifier of an agent within a conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Sequential id for a role, e.g. `architect-2`
    pub fn for_role(agent_type: &AgentType, sequence: usize) -> Self {
        Self(format!("{}-{}", agent_type.as_str(), sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of an agent (Value Object)
///
/// The known roles cover the selector catalog and the static tier table;
/// sub-agents proposed by the oracle may carry any other role as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentType {
    Coordinator,
    Architect,
    Researcher,
    Analyst,
    Developer,
    Qa,
    Documentation,
    Security,
    Designer,
    Strategist,
    DataScientist,
    Helper,
    Custom(String),
}

impl AgentType {
    pub fn as_str(&self) -> &str {
        match self {
            AgentType::Coordinator => "coordinator",
            AgentType::Architect => "architect",
            AgentType::Researcher => "researcher",
            AgentType::Analyst => "analyst",
            AgentType::Developer => "developer",
            AgentType::Qa => "qa",
            AgentType::Documentation => "documentation",
            AgentType::Security => "security",
            AgentType::Designer => "designer",
            AgentType::Strategist => "strategist",
            AgentType::DataScientist => "data_scientist",
            AgentType::Helper => "helper",
            AgentType::Custom(s) => s,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            AgentType::Qa => "QA Engineer".to_string(),
            AgentType::DataScientist => "Data Scientist".to_string(),
            other => {
                let s = other.as_str().replace(['_', '-'], " ");
                let mut chars = s.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, AgentType::Custom(_))
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Ok(match normalized.as_str() {
            "coordinator" | "orchestrator" | "lead" => AgentType::Coordinator,
            "architect" | "system_architect" => AgentType::Architect,
            "researcher" | "research" => AgentType::Researcher,
            "analyst" | "business_analyst" => AgentType::Analyst,
            "developer" | "engineer" | "programmer" => AgentType::Developer,
            "qa" | "tester" | "qa_engineer" | "quality_assurance" => AgentType::Qa,
            "documentation" | "docs" | "technical_writer" | "writer" => AgentType::Documentation,
            "security" | "security_expert" => AgentType::Security,
            "designer" | "ux_designer" => AgentType::Designer,
            "strategist" | "strategy" => AgentType::Strategist,
            "data_scientist" | "data" => AgentType::DataScientist,
            "helper" | "assistant" => AgentType::Helper,
            _ => AgentType::Custom(normalized),
        })
    }
}

impl Serialize for AgentType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AgentType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(agent_type) = s.parse::<AgentType>();
        Ok(agent_type)
    }
}

/// Task complexity used for dynamic tier scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// Weight contributed to the dynamic tier score (1-3)
    pub fn weight(&self) -> i32 {
        match self {
            Complexity::Low => 1,
            Complexity::Medium => 2,
            Complexity::High => 3,
        }
    }

    /// Infer complexity from free text ("complex"/"critical" → high)
    pub fn from_keywords(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("complex") || lower.contains("critical") {
            Complexity::High
        } else if lower.contains("simple") || lower.contains("basic") || lower.contains("trivial")
        {
            Complexity::Low
        } else {
            Complexity::Medium
        }
    }

    /// Map an objective complexity score (1-10)
    pub fn from_score(score: u8) -> Self {
        match score {
            7.. => Complexity::High,
            4..=6 => Complexity::Medium,
            _ => Complexity::Low,
        }
    }
}

/// A role-labeled proxy that delegates its turns to the oracle (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub agent_type: AgentType,
    pub specialization: String,
    pub capabilities: Vec<String>,
    /// Model id bound by the tiered selector, if any
    pub assigned_model: Option<String>,
    pub purpose: String,
    pub is_sub_agent: bool,
    pub parent_agent_id: Option<AgentId>,
}

impl Agent {
    /// Create a main agent
    pub fn main(id: AgentId, agent_type: AgentType, specialization: impl Into<String>) -> Self {
        Self {
            id,
            agent_type,
            specialization: specialization.into(),
            capabilities: Vec::new(),
            assigned_model: None,
            purpose: String::new(),
            is_sub_agent: false,
            parent_agent_id: None,
        }
    }

    /// Create a sub-agent owned by `parent`
    pub fn sub_agent(
        id: AgentId,
        agent_type: AgentType,
        specialization: impl Into<String>,
        parent: &AgentId,
    ) -> Self {
        Self {
            is_sub_agent: true,
            parent_agent_id: Some(parent.clone()),
            ..Self::main(id, agent_type, specialization)
        }
    }

    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    /// Short label for prompts and logs, e.g. "Architect (distributed systems)"
    pub fn label(&self) -> String {
        if self.specialization.is_empty() {
            self.agent_type.display_name()
        } else {
            format!(
                "{} ({})",
                self.agent_type.display_name(),
                self.specialization
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_type_parsing_synonyms() {
        assert_eq!("QA Engineer".parse::<AgentType>().unwrap(), AgentType::Qa);
        assert_eq!("Docs".parse::<AgentType>().unwrap(), AgentType::Documentation);
        assert_eq!(
            "performance tuner".parse::<AgentType>().unwrap(),
            AgentType::Custom("performance_tuner".to_string())
        );
    }

    #[test]
    fn test_agent_type_serde_roundtrip() {
        let json = serde_json::to_string(&AgentType::DataScientist).unwrap();
        assert_eq!(json, "\"data_scientist\"");
        let back: AgentType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AgentType::DataScientist);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(AgentType::Qa.display_name(), "QA Engineer");
        assert_eq!(AgentType::Architect.display_name(), "Architect");
        assert_eq!(
            AgentType::Custom("api_specialist".to_string()).display_name(),
            "Api specialist"
        );
    }

    #[test]
    fn test_complexity_from_keywords() {
        assert_eq!(
            Complexity::from_keywords("Handles critical payment flows"),
            Complexity::High
        );
        assert_eq!(Complexity::from_keywords("basic formatting"), Complexity::Low);
        assert_eq!(Complexity::from_keywords("api review"), Complexity::Medium);
        assert_eq!(Complexity::High.weight(), 3);
    }

    #[test]
    fn test_complexity_from_score() {
        assert_eq!(Complexity::from_score(9), Complexity::High);
        assert_eq!(Complexity::from_score(5), Complexity::Medium);
        assert_eq!(Complexity::from_score(2), Complexity::Low);
    }

    #[test]
    fn test_sub_agent_links_parent() {
        let parent = AgentId::for_role(&AgentType::Architect, 1);
        let sub = Agent::sub_agent(
            AgentId::new("architect-1-sub-1"),
            AgentType::Helper,
            "diagram drafting",
            &parent,
        );
        assert!(sub.is_sub_agent);
        assert_eq!(sub.parent_agent_id.as_ref(), Some(&parent));
        assert_eq!(parent.as_str(), "architect-1");
    }
}
