//! Agent → tier mapping.

use super::ModelTier;
use crate::agent::{Agent, AgentType, Complexity};

/// Tier for primary roles, `None` for roles left to dynamic scoring
pub fn static_tier(agent_type: &AgentType) -> Option<ModelTier> {
    match agent_type {
        AgentType::Coordinator | AgentType::Architect => Some(ModelTier::Premium),
        AgentType::Researcher | AgentType::Analyst | AgentType::Developer => {
            Some(ModelTier::Balanced)
        }
        AgentType::Qa | AgentType::Documentation => Some(ModelTier::Fast),
        AgentType::Helper => Some(ModelTier::Economical),
        _ => None,
    }
}

/// Score an agent's task for tier mapping.
///
/// complexity weight (1-3), +2 reasoning, +1 analysis, +1 code generation,
/// -1 simple task, +2 strategic, +2 critical, -1 support role.
pub fn dynamic_tier_score(agent: &Agent, complexity: Complexity) -> i32 {
    let text = format!("{} {}", agent.specialization, agent.purpose).to_lowercase();
    let has = |cap: &str| agent.has_capability(cap);
    let mentions = |markers: &[&str]| markers.iter().any(|m| text.contains(m));

    let mut score = complexity.weight();
    if has("reasoning") || mentions(&["reasoning", "logic"]) {
        score += 2;
    }
    if has("analysis") || has("data_analysis") {
        score += 1;
    }
    if has("code_generation") {
        score += 1;
    }
    if mentions(&["simple", "basic", "trivial"]) {
        score -= 1;
    }
    if has("strategic_planning") || mentions(&["strateg"]) {
        score += 2;
    }
    if mentions(&["critical"]) {
        score += 2;
    }
    if agent.agent_type == AgentType::Helper || mentions(&["support", "assist"]) {
        score -= 1;
    }
    score
}

pub fn tier_for_score(score: i32) -> ModelTier {
    match score {
        6.. => ModelTier::Premium,
        4..=5 => ModelTier::Balanced,
        2..=3 => ModelTier::Fast,
        _ => ModelTier::Economical,
    }
}

/// Requested tier for an agent: static table for main agents of a primary
/// role, dynamic score for sub-agents and unmapped roles.
pub fn tier_for_agent(agent: &Agent, complexity: Complexity) -> ModelTier {
    if !agent.is_sub_agent
        && let Some(tier) = static_tier(&agent.agent_type)
    {
        return tier;
    }
    tier_for_score(dynamic_tier_score(agent, complexity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentId;

    fn sub_agent(agent_type: AgentType, specialization: &str, caps: &[&str]) -> Agent {
        Agent::sub_agent(
            AgentId::new("sub-1"),
            agent_type,
            specialization,
            &AgentId::new("parent-1"),
        )
        .with_capabilities(caps.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_static_table() {
        let architect = Agent::main(AgentId::new("a"), AgentType::Architect, "");
        assert_eq!(tier_for_agent(&architect, Complexity::Low), ModelTier::Premium);
        let qa = Agent::main(AgentId::new("q"), AgentType::Qa, "");
        assert_eq!(tier_for_agent(&qa, Complexity::High), ModelTier::Fast);
    }

    #[test]
    fn test_analysis_high_complexity_is_balanced() {
        let agent = sub_agent(AgentType::Analyst, "market sizing", &["analysis"]);
        assert_eq!(dynamic_tier_score(&agent, Complexity::High), 4);
        assert_eq!(tier_for_agent(&agent, Complexity::High), ModelTier::Balanced);
    }

    #[test]
    fn test_sub_agents_ignore_static_table() {
        // A helper sub-agent on a critical strategic task still scores high
        let agent = sub_agent(AgentType::Helper, "critical strategy review", &[]);
        // 3 + 2 (strategic) + 2 (critical) - 1 (helper)
        assert_eq!(dynamic_tier_score(&agent, Complexity::High), 6);
        assert_eq!(tier_for_agent(&agent, Complexity::High), ModelTier::Premium);
    }

    #[test]
    fn test_unmapped_main_role_is_scored() {
        let agent = Agent::main(AgentId::new("s"), AgentType::Security, "basic checklist")
            .with_capabilities(vec!["security_review".to_string()]);
        // 1 - 1 (simple) = 0
        assert_eq!(tier_for_agent(&agent, Complexity::Low), ModelTier::Economical);
    }

    #[test]
    fn test_score_thresholds() {
        assert_eq!(tier_for_score(7), ModelTier::Premium);
        assert_eq!(tier_for_score(6), ModelTier::Premium);
        assert_eq!(tier_for_score(4), ModelTier::Balanced);
        assert_eq!(tier_for_score(2), ModelTier::Fast);
        assert_eq!(tier_for_score(1), ModelTier::Economical);
        assert_eq!(tier_for_score(-2), ModelTier::Economical);
    }
}
