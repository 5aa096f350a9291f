//! Prompt templates for each stage of a council discussion

use crate::action::ActionKind;
use crate::agent::Agent;
use crate::objective::Objective;
use crate::round::{Exchange, RoundPlan};
use crate::core::string::truncate;

/// Exchange excerpt length inside prompts
const EXCERPT_LEN: usize = 600;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Shared system prompt for every agent turn
    pub fn agent_system(agent: &Agent) -> String {
        let capabilities = if agent.capabilities.is_empty() {
            "general problem solving".to_string()
        } else {
            agent.capabilities.join(", ")
        };
        let mut prompt = format!(
            r#"You are {}, a member of a council of specialists working towards a shared objective.
Your capabilities: {capabilities}.
Contribute from your specialty. Build on what others said, say clearly when you agree or disagree, and keep answers concrete."#,
            agent.label()
        );
        if !agent.purpose.is_empty() {
            prompt.push_str(&format!("\nYour purpose: {}", agent.purpose));
        }
        prompt
    }

    /// Ask a model to analyze the objective into a structured plan
    pub fn objective_analysis(objective: &str, complexity_hint: Option<u8>) -> String {
        let hint = complexity_hint
            .map(|c| format!("\nThe requester estimates complexity {c}/10."))
            .unwrap_or_default();
        format!(
            r#"Analyze the following objective for a team of AI specialists.

Objective: {objective}{hint}

Respond with a JSON object only:
{{
  "complexity": <1-10>,
  "requiredCapabilities": ["..."],
  "suggestedAgents": ["architect" | "researcher" | "analyst" | "developer" | "qa" | "documentation" | "coordinator" | "security" | "..."],
  "estimatedScope": "small" | "medium" | "large"
}}"#
        )
    }

    /// Ask a model to plan the next round
    pub fn round_plan(
        objective: &Objective,
        round: u32,
        phase: &str,
        recent: &[&Exchange],
        open_questions: &[String],
    ) -> String {
        let mut prompt = format!(
            r#"Objective: {}
We are about to start round {round} ({phase} phase) of the discussion.
"#,
            objective.main_objective
        );
        push_exchanges(&mut prompt, recent);
        push_list(&mut prompt, "Open questions", open_questions);
        prompt.push_str(
            r#"
Plan this round. Respond with a JSON object only:
{
  "focus": "one sentence",
  "objectives": ["..."],
  "approach": "how the agents should work",
  "questions": ["..."]
}"#,
        );
        prompt
    }

    /// Ask a model to pick the next action
    pub fn action_suggestion(objective: &Objective, plan: &RoundPlan, recent: &[&Exchange]) -> String {
        let actions = ActionKind::ALL
            .iter()
            .map(|kind| format!("- {}: {}", kind.as_str(), kind.description()))
            .collect::<Vec<_>>()
            .join("\n");
        let mut prompt = format!(
            r#"Objective: {}
Round {} ({}), focus: {}
"#,
            objective.main_objective, plan.round_number, plan.phase, plan.focus
        );
        push_list(&mut prompt, "Round objectives", &plan.objectives);
        push_exchanges(&mut prompt, recent);
        prompt.push_str(&format!(
            r#"
Choose the single most useful next action from:
{actions}

Respond with a JSON object only:
{{"action": "<kind>", "priority": <1-10>, "rationale": "...", "details": "query, focus or other parameters"}}"#
        ));
        prompt
    }

    /// One agent's contribution to the current round
    pub fn agent_turn(
        objective: &Objective,
        plan: &RoundPlan,
        task: &str,
        recent: &[&Exchange],
        memories: &[String],
    ) -> String {
        let mut prompt = format!(
            r#"Objective: {}
Round {} ({} phase). Focus: {}
Approach: {}
Your task this turn: {task}
"#,
            objective.main_objective, plan.round_number, plan.phase, plan.focus, plan.approach
        );
        push_list(&mut prompt, "Questions to address", &plan.questions);
        push_list(&mut prompt, "Things you remember", memories);
        push_exchanges(&mut prompt, recent);
        prompt.push_str("\nGive your contribution in a few focused paragraphs.");
        prompt
    }

    /// Ask a parent agent which sub-agents it needs
    pub fn sub_agent_specs(parent: &Agent, objective: &Objective, focus: &str) -> String {
        format!(
            r#"You are {}. Objective: {}
Current focus: {focus}

Which specialist sub-agents (at most 3) would help you? Respond with JSON only:
{{"subAgents": [{{"type": "...", "specialization": "...", "purpose": "..."}}]}}"#,
            parent.label(),
            objective.main_objective
        )
    }

    /// Ask a model whether the discussion should continue
    pub fn consensus_vote(
        objective: &Objective,
        iteration: u32,
        round_assessment: &str,
        decisions: &[String],
        open_questions: &[String],
        recent: &[&Exchange],
    ) -> String {
        let mut prompt = format!(
            r#"Objective: {}
The council has completed {iteration} iterations.
Assessment of the last round: {round_assessment}
"#,
            objective.main_objective
        );
        push_list(&mut prompt, "Decisions so far", decisions);
        push_list(&mut prompt, "Open questions", open_questions);
        push_exchanges(&mut prompt, recent);
        prompt.push_str(
            r#"
Should the discussion continue? Respond with JSON only:
{"shouldContinue": true | false, "confidence": <0-1>, "completionPercentage": <0-100>, "reasoning": "..."}"#,
        );
        prompt
    }

    /// Ask a model for a narrative synthesis of the whole discussion
    pub fn conclusion(
        objective: &Objective,
        recent: &[&Exchange],
        decisions: &[String],
        open_questions: &[String],
    ) -> String {
        let mut prompt = format!(
            "Objective: {}\nThe discussion is over. Write its conclusion.\n",
            objective.main_objective
        );
        push_exchanges(&mut prompt, recent);
        push_list(&mut prompt, "Decisions", decisions);
        push_list(&mut prompt, "Open questions", open_questions);
        prompt.push_str(
            r#"
Summarize what was accomplished, the key insights and your recommendations.
Use short declarative sentences."#,
        );
        prompt
    }

    /// Turn knowledge-search results into a contribution
    pub fn research(objective: &Objective, query: &str, findings: &[String]) -> String {
        let mut prompt = format!(
            "Objective: {}\nYou searched for: {query}\n",
            objective.main_objective
        );
        push_list(&mut prompt, "Search results", findings);
        prompt.push_str(
            "\nExplain what these results mean for the objective. Flag anything time-sensitive or unverified.",
        );
        prompt
    }

    /// Ask for a deeper look at extracted risks and opportunities
    pub fn deep_analysis(
        objective: &Objective,
        focus: &str,
        risks: &[String],
        opportunities: &[String],
    ) -> String {
        let mut prompt = format!(
            "Objective: {}\nAnalyze in depth: {focus}\n",
            objective.main_objective
        );
        push_list(&mut prompt, "Risks raised", risks);
        push_list(&mut prompt, "Opportunities raised", opportunities);
        prompt.push_str("\nRank the most important risks and opportunities and propose mitigations.");
        prompt
    }
}

fn push_list(prompt: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    prompt.push_str(&format!("\n{title}:\n"));
    for item in items {
        prompt.push_str(&format!("- {item}\n"));
    }
}

fn push_exchanges(prompt: &mut String, exchanges: &[&Exchange]) {
    if exchanges.is_empty() {
        return;
    }
    prompt.push_str("\nRecent discussion:\n");
    for exchange in exchanges {
        prompt.push_str(&format!(
            "\n--- {} ({}) ---\n{}\n",
            exchange.agent_id,
            exchange.agent_type,
            truncate(exchange.content.trim(), EXCERPT_LEN)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentId, AgentType};

    fn objective() -> Objective {
        Objective::unanalyzed("Design a rate limiter", None)
    }

    #[test]
    fn test_objective_analysis_format() {
        let prompt = PromptTemplate::objective_analysis("Design a rate limiter", Some(7));
        assert!(prompt.contains("Design a rate limiter"));
        assert!(prompt.contains("complexity 7/10"));
        assert!(prompt.contains("estimatedScope"));
    }

    #[test]
    fn test_action_prompt_lists_every_kind() {
        let plan = RoundPlan::fallback(1);
        let prompt = PromptTemplate::action_suggestion(&objective(), &plan, &[]);
        for kind in ActionKind::ALL {
            assert!(prompt.contains(kind.as_str()));
        }
        assert!(!prompt.contains("Recent discussion"));
    }

    #[test]
    fn test_agent_turn_includes_context() {
        let plan = RoundPlan::fallback(3);
        let exchange = Exchange::new(
            2,
            AgentId::new("architect-1"),
            AgentType::Architect,
            "m",
            "Token buckets per tenant.",
        );
        let memories = vec!["Redis is available".to_string()];
        let prompt = PromptTemplate::agent_turn(
            &objective(),
            &plan,
            "assess risks",
            &[&exchange],
            &memories,
        );
        assert!(prompt.contains("architect-1"));
        assert!(prompt.contains("Redis is available"));
        assert!(prompt.contains("assess risks"));
    }

    #[test]
    fn test_agent_system_mentions_role() {
        let agent = Agent::main(AgentId::new("qa-1"), AgentType::Qa, "load testing")
            .with_purpose("Break things");
        let prompt = PromptTemplate::agent_system(&agent);
        assert!(prompt.contains("load testing"));
        assert!(prompt.contains("Break things"));
    }
}
