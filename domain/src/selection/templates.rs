//! Role templates the selector composes agents from.

use crate::agent::{Agent, AgentId, AgentType};
use serde::{Deserialize, Serialize};

/// A role template with its expertise keywords and fixed capability list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTemplate {
    pub agent_type: AgentType,
    pub specialization: String,
    /// Keywords that count double towards expertise match
    pub primary_expertise: Vec<String>,
    pub secondary_expertise: Vec<String>,
    pub capabilities: Vec<String>,
}

impl AgentTemplate {
    pub fn new(agent_type: AgentType, specialization: impl Into<String>) -> Self {
        Self {
            agent_type,
            specialization: specialization.into(),
            primary_expertise: Vec::new(),
            secondary_expertise: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    pub fn with_primary(mut self, keywords: &[&str]) -> Self {
        self.primary_expertise = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn with_secondary(mut self, keywords: &[&str]) -> Self {
        self.secondary_expertise = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn with_capabilities(mut self, capabilities: &[&str]) -> Self {
        self.capabilities = capabilities.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Instantiate as a main agent
    pub fn to_agent(&self, id: AgentId) -> Agent {
        Agent::main(id, self.agent_type.clone(), self.specialization.clone())
            .with_capabilities(self.capabilities.clone())
    }
}

/// The built-in template catalog
pub fn default_catalog() -> Vec<AgentTemplate> {
    vec![
        AgentTemplate::new(AgentType::Coordinator, "discussion facilitation")
            .with_primary(&["coordinat", "plan", "organiz", "priorit"])
            .with_secondary(&["team", "goal", "roadmap", "decision"])
            .with_capabilities(&["coordination", "strategic_planning", "reasoning"]),
        AgentTemplate::new(AgentType::Architect, "system architecture")
            .with_primary(&["architect", "design", "system", "scalab"])
            .with_secondary(&["component", "service", "infrastructure", "pattern"])
            .with_capabilities(&["system_design", "reasoning", "integration"]),
        AgentTemplate::new(AgentType::Researcher, "background research")
            .with_primary(&["research", "investigat", "explor", "survey"])
            .with_secondary(&["source", "literature", "trend", "compar"])
            .with_capabilities(&["research", "analysis"]),
        AgentTemplate::new(AgentType::Analyst, "requirements analysis")
            .with_primary(&["analy", "requirement", "evaluat", "assess"])
            .with_secondary(&["metric", "trade", "risk", "business"])
            .with_capabilities(&["analysis", "reasoning"]),
        AgentTemplate::new(AgentType::Developer, "backend implementation")
            .with_primary(&["implement", "code", "backend", "api"])
            .with_secondary(&["database", "server", "performance", "library"])
            .with_capabilities(&["code_generation", "integration", "optimization"]),
        AgentTemplate::new(AgentType::Developer, "frontend implementation")
            .with_primary(&["frontend", "interface", "web", "client"])
            .with_secondary(&["component", "browser", "mobile", "code"])
            .with_capabilities(&["code_generation", "user_experience"]),
        AgentTemplate::new(AgentType::Qa, "quality assurance")
            .with_primary(&["test", "quality", "verif", "bug"])
            .with_secondary(&["regression", "coverage", "edge case", "reliab"])
            .with_capabilities(&["testing", "analysis"]),
        AgentTemplate::new(AgentType::Documentation, "technical writing")
            .with_primary(&["document", "guide", "explain", "tutorial"])
            .with_secondary(&["readme", "onboard", "reference", "write"])
            .with_capabilities(&["documentation"]),
        AgentTemplate::new(AgentType::Security, "security review")
            .with_primary(&["secur", "threat", "vulnerab", "auth"])
            .with_secondary(&["privacy", "complian", "encrypt", "attack"])
            .with_capabilities(&["security_review", "reasoning"]),
        AgentTemplate::new(AgentType::Designer, "user experience")
            .with_primary(&["user experience", "ux", "usability", "visual"])
            .with_secondary(&["user", "layout", "accessib", "prototype"])
            .with_capabilities(&["user_experience", "system_design"]),
        AgentTemplate::new(AgentType::Strategist, "product strategy")
            .with_primary(&["strateg", "market", "business", "vision"])
            .with_secondary(&["competit", "growth", "cost", "long-term"])
            .with_capabilities(&["strategic_planning", "reasoning", "analysis"]),
        AgentTemplate::new(AgentType::DataScientist, "data modeling")
            .with_primary(&["data", "statistic", "machine learning", "model"])
            .with_secondary(&["dataset", "predict", "metric", "experiment"])
            .with_capabilities(&["data_analysis", "analysis", "research"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 12);
        assert!(catalog.iter().all(|t| !t.capabilities.is_empty()));
        let developers = catalog
            .iter()
            .filter(|t| t.agent_type == AgentType::Developer)
            .count();
        assert_eq!(developers, 2);
    }

    #[test]
    fn test_to_agent_copies_capabilities() {
        let template = &default_catalog()[1];
        let agent = template.to_agent(AgentId::for_role(&template.agent_type, 1));
        assert_eq!(agent.id.as_str(), "architect-1");
        assert!(agent.has_capability("system_design"));
        assert!(!agent.is_sub_agent);
    }
}
