//! Action handlers.
//!
//! Every handler returns the round's exchanges. Oracle and search failures
//! degrade to fallback exchanges or a plain discussion; only cancellation
//! propagates.

use super::{Discussion, OrchestratorError};
use crate::ports::conversation_logger::ConversationEvent;
use crate::ports::llm_gateway::OracleRequest;
use crate::use_cases::shared::check_cancelled;
use council_domain::agent::sub_agent::MAX_SUB_AGENTS;
use council_domain::core::string::truncate;
use council_domain::{
    ActionKind, ActionSuggestion, Agent, AgentId, AgentType, Complexity, Exchange, MemoryKind,
    PromptTemplate, RetrieveOptions, RoundPlan, StoreRequest, SubAgentSpec,
    default_sub_agent_specs, infer_capabilities, now_millis, parse_sub_agent_specs,
};
use serde_json::json;
use tracing::{debug, info, warn};

/// Exchanges from earlier rounds an agent sees
const TURN_CONTEXT: usize = 4;
/// Memories recalled into a turn prompt
const RECALL_LIMIT: usize = 3;
/// Exchanges scanned for risks and opportunities
const ANALYSIS_WINDOW: usize = 8;

impl Discussion<'_> {
    /// Run the chosen action
    pub(super) async fn dispatch(
        &mut self,
        action: &ActionSuggestion,
        plan: &RoundPlan,
    ) -> Result<Vec<Exchange>, OrchestratorError> {
        check_cancelled(self.token)?;
        match action.kind {
            ActionKind::CreateAgent => self.create_sub_agents(action, plan).await,
            ActionKind::AgentDiscussion => {
                let task = task_for(action, &plan.focus);
                self.discussion_round(plan, &task).await
            }
            ActionKind::WebResearch => self.web_research(action, plan).await,
            ActionKind::DeepAnalysis => self.deep_analysis(action, plan).await,
            ActionKind::RequirementGathering
            | ActionKind::SolutionDesign
            | ActionKind::ImplementationPlanning
            | ActionKind::RiskAssessment
            | ActionKind::IntegrationDesign
            | ActionKind::TestingStrategy
            | ActionKind::DeploymentPlanning => {
                let task = task_for(action, action.kind.description());
                self.focused_discussion(action.kind, plan, &task).await
            }
            ActionKind::Other => {
                debug!("Unrecognized action, continuing the discussion");
                let task = task_for(action, &plan.focus);
                self.discussion_round(plan, &task).await
            }
        }
    }

    /// Every agent takes one turn, in order
    async fn discussion_round(
        &mut self,
        plan: &RoundPlan,
        task: &str,
    ) -> Result<Vec<Exchange>, OrchestratorError> {
        let speakers = self.agents.clone();
        self.turns(&speakers, plan, |_| task.to_string()).await
    }

    /// Agents whose role fits the action speak first; everyone else follows
    async fn focused_discussion(
        &mut self,
        kind: ActionKind,
        plan: &RoundPlan,
        task: &str,
    ) -> Result<Vec<Exchange>, OrchestratorError> {
        let preferred = preferred_roles(kind);
        let mut speakers: Vec<Agent> = self
            .agents
            .iter()
            .filter(|a| preferred.contains(&a.agent_type))
            .cloned()
            .collect();
        speakers.extend(
            self.agents
                .iter()
                .filter(|a| !preferred.contains(&a.agent_type))
                .cloned(),
        );
        self.turns(&speakers, plan, |_| task.to_string()).await
    }

    async fn turns(
        &mut self,
        speakers: &[Agent],
        plan: &RoundPlan,
        task: impl Fn(&Agent) -> String,
    ) -> Result<Vec<Exchange>, OrchestratorError> {
        let mut exchanges = Vec::with_capacity(speakers.len());
        for agent in speakers {
            let exchange = self.agent_turn(agent, plan, &task(agent), &exchanges).await?;
            exchanges.push(exchange);
        }
        Ok(exchanges)
    }

    /// One agent contribution, with recalled memories and recent context
    async fn agent_turn(
        &mut self,
        agent: &Agent,
        plan: &RoundPlan,
        task: &str,
        this_round: &[Exchange],
    ) -> Result<Exchange, OrchestratorError> {
        check_cancelled(self.token)?;
        let now = now_millis();
        let memories: Vec<String> = self
            .memory
            .recall(
                &agent.id,
                &format!("{} {}", plan.focus, task),
                &RetrieveOptions::default().limit(RECALL_LIMIT),
                now,
            )
            .into_iter()
            .map(|m| m.item.content)
            .collect();

        let prompt = {
            let mut recent = self.conversation.recent_substantive(TURN_CONTEXT);
            recent.extend(this_round.iter().filter(|e| !e.is_fallback));
            PromptTemplate::agent_turn(&self.objective, plan, task, &recent, &memories)
        };
        self.speak(agent, prompt, "discussion").await
    }

    /// Send a prompt as `agent` and record the answer
    async fn speak(
        &mut self,
        agent: &Agent,
        prompt: String,
        category: &str,
    ) -> Result<Exchange, OrchestratorError> {
        let model = self.model_for(agent);
        let request = OracleRequest::new(&model, prompt)
            .with_system(PromptTemplate::agent_system(agent))
            .for_agent(agent.agent_type.clone());
        let response = self.oracle.ask(request).await;
        check_cancelled(self.token)?;

        self.progress.on_agent_response(agent, &response);
        self.events.push(
            ConversationEvent::agent_response(json!({
                "agent": agent.id.as_str(),
                "agent_type": agent.agent_type.as_str(),
                "model": model,
                "content": response.content,
                "fallback": response.is_fallback(),
            }))
            .with_metadata(json!({ "round": self.rounds.current_round() })),
        );

        let round = self.rounds.current_round();
        let exchange = Exchange::new(
            round,
            agent.id.clone(),
            agent.agent_type.clone(),
            model,
            response.content.clone(),
        )
        .fallback(response.is_fallback());

        if !exchange.is_fallback {
            self.memory
                .remember(
                    &agent.id,
                    MemoryKind::ShortTerm,
                    &response.content,
                    StoreRequest::from_source("agent").with_category(category),
                    now_millis(),
                    self.token,
                )
                .await?;
        }
        Ok(exchange)
    }

    /// A parent agent asks for specialists, who then take their first turn.
    ///
    /// Parents are main agents with room for more sub-agents; when none is
    /// left the round becomes a plain discussion.
    async fn create_sub_agents(
        &mut self,
        action: &ActionSuggestion,
        plan: &RoundPlan,
    ) -> Result<Vec<Exchange>, OrchestratorError> {
        let Some(parent) = self.next_parent() else {
            info!("Every agent already has its sub-agents, continuing the discussion");
            let task = task_for(action, &plan.focus);
            return self.discussion_round(plan, &task).await;
        };

        let focus = task_for(action, &plan.focus);
        let prompt = PromptTemplate::sub_agent_specs(&parent, &self.objective, &focus);
        let response = self
            .oracle
            .ask(OracleRequest::new(self.model_for(&parent), prompt))
            .await;
        check_cancelled(self.token)?;

        let specs = (!response.is_fallback())
            .then(|| parse_sub_agent_specs(&response.content))
            .flatten()
            .unwrap_or_else(|| {
                debug!("Using default sub-agents for {}", parent.agent_type);
                default_sub_agent_specs(&parent.agent_type)
            });

        let mut created: Vec<(Agent, SubAgentSpec)> = Vec::new();
        for spec in specs {
            check_cancelled(self.token)?;
            if let Some(agent) = self.spawn_sub_agent(&parent, &spec).await? {
                created.push((agent, spec));
            }
        }
        if created.is_empty() {
            warn!("No sub-agent of {} could be given a model", parent.id);
            return self.discussion_round(plan, &focus).await;
        }

        let agents: Vec<Agent> = created.iter().map(|(agent, _)| agent.clone()).collect();
        let names: Vec<&str> = agents.iter().map(|a| a.id.as_str()).collect();
        info!("{} created sub-agents: {}", parent.id, names.join(", "));
        self.events.push(ConversationEvent::system(json!({
            "event": "sub_agents_created",
            "parent": parent.id.as_str(),
            "agents": names,
        })));
        self.memory
            .remember(
                &parent.id,
                MemoryKind::Episodic,
                &format!("Created sub-agents {} for: {}", names.join(", "), focus),
                StoreRequest::from_source("agent").with_category("delegation"),
                now_millis(),
                self.token,
            )
            .await?;
        self.progress.on_agents_joined(&agents);
        self.agents.extend(agents);

        let mut exchanges = Vec::with_capacity(created.len());
        for (agent, spec) in &created {
            let task = if spec.purpose.is_empty() {
                focus.clone()
            } else {
                spec.purpose.clone()
            };
            let exchange = self.agent_turn(agent, plan, &task, &exchanges).await?;
            exchanges.push(exchange);
        }
        Ok(exchanges)
    }

    /// Main agent that has not yet used up its sub-agent allowance
    fn next_parent(&self) -> Option<Agent> {
        self.agents
            .iter()
            .filter(|a| !a.is_sub_agent)
            .find(|a| {
                self.agents
                    .iter()
                    .filter(|s| s.parent_agent_id.as_ref() == Some(&a.id))
                    .count()
                    < MAX_SUB_AGENTS
            })
            .cloned()
    }

    /// Create, bind and open memory for one sub-agent
    async fn spawn_sub_agent(
        &mut self,
        parent: &Agent,
        spec: &SubAgentSpec,
    ) -> Result<Option<Agent>, OrchestratorError> {
        self.sub_agent_seq += 1;
        let id = AgentId::new(format!("{}-sub-{}", parent.id, self.sub_agent_seq));
        let capabilities = infer_capabilities(spec.agent_type.as_str(), &spec.specialization);
        let mut agent = Agent::sub_agent(
            id,
            spec.agent_type.clone(),
            spec.specialization.clone(),
            &parent.id,
        )
        .with_capabilities(capabilities)
        .with_purpose(spec.purpose.clone());

        let complexity = Complexity::from_keywords(&spec.descriptor_text());
        let Some(assignment) = self.registry.assign(&agent, complexity) else {
            warn!("No model available for sub-agent {}", agent.id);
            return Ok(None);
        };
        agent.assigned_model = Some(assignment.model_id);

        let now = now_millis();
        self.memory.open(&agent.id, now, self.token).await?;
        self.memory
            .remember(
                &agent.id,
                MemoryKind::Working,
                &format!("Assigned by {}: {}", parent.id, spec.purpose),
                StoreRequest::from_source("agent").with_category("objective"),
                now,
                self.token,
            )
            .await?;
        Ok(Some(agent))
    }

    /// Search, remember the findings, then let the researcher interpret them
    async fn web_research(
        &mut self,
        action: &ActionSuggestion,
        plan: &RoundPlan,
    ) -> Result<Vec<Exchange>, OrchestratorError> {
        let query = if action.details.trim().is_empty() {
            format!("{} {}", self.objective.main_objective, plan.focus)
        } else {
            action.details.trim().to_string()
        };
        let limit = self.config.orchestrator.research_results;
        let results = match self.search.search(&query, limit).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Knowledge search failed: {}", e);
                Vec::new()
            }
        };
        check_cancelled(self.token)?;
        self.events.push(ConversationEvent::tool_usage(json!({
            "tool": "knowledge_search",
            "query": query,
            "results": results.len(),
        })));

        let Some(researcher) = self.lead_for(&[AgentType::Researcher, AgentType::Analyst]) else {
            return Ok(Vec::new());
        };
        if results.is_empty() {
            info!("No search results for {:?}, continuing the discussion", query);
            let task = task_for(action, &plan.focus);
            return self.discussion_round(plan, &task).await;
        }

        let findings: Vec<String> = results.iter().map(|r| r.summary()).collect();
        let now = now_millis();
        for finding in &findings {
            self.memory
                .remember(
                    &researcher.id,
                    MemoryKind::Semantic,
                    finding,
                    StoreRequest::from_source("research")
                        .with_category("finding")
                        .with_confidence(0.7),
                    now,
                    self.token,
                )
                .await?;
        }

        let prompt = PromptTemplate::research(&self.objective, &query, &findings);
        let exchange = self.speak(&researcher, prompt, "research").await?;
        Ok(vec![exchange])
    }

    /// Pull risks and opportunities out of recent exchanges and have the
    /// analyst dig into them
    async fn deep_analysis(
        &mut self,
        action: &ActionSuggestion,
        plan: &RoundPlan,
    ) -> Result<Vec<Exchange>, OrchestratorError> {
        let Some(analyst) = self.lead_for(&[AgentType::Analyst, AgentType::Architect]) else {
            return Ok(Vec::new());
        };
        let recent_text = self
            .conversation
            .recent_substantive(ANALYSIS_WINDOW)
            .iter()
            .map(|e| e.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let risks = self.analyzer.risks(&recent_text);
        let opportunities = self.analyzer.opportunities(&recent_text);
        debug!(
            "Deep analysis over {} risks and {} opportunities",
            risks.len(),
            opportunities.len()
        );

        let now = now_millis();
        for risk in &risks {
            self.memory
                .remember(
                    &analyst.id,
                    MemoryKind::LongTerm,
                    &truncate(risk, 300),
                    StoreRequest::from_source("analysis").with_category("risk"),
                    now,
                    self.token,
                )
                .await?;
        }

        let focus = task_for(action, &plan.focus);
        let prompt = PromptTemplate::deep_analysis(&self.objective, &focus, &risks, &opportunities);
        let exchange = self.speak(&analyst, prompt, "analysis").await?;
        Ok(vec![exchange])
    }
}

/// The action's details when given, else the default task
fn task_for(action: &ActionSuggestion, default: &str) -> String {
    let details = action.details.trim();
    if details.is_empty() {
        default.to_string()
    } else {
        details.to_string()
    }
}

/// Roles that lead a focused action
fn preferred_roles(kind: ActionKind) -> Vec<AgentType> {
    match kind {
        ActionKind::RequirementGathering => vec![AgentType::Analyst, AgentType::Researcher],
        ActionKind::SolutionDesign | ActionKind::IntegrationDesign => {
            vec![AgentType::Architect, AgentType::Developer]
        }
        ActionKind::ImplementationPlanning => vec![AgentType::Developer, AgentType::Coordinator],
        ActionKind::RiskAssessment => vec![AgentType::Security, AgentType::Analyst],
        ActionKind::TestingStrategy => vec![AgentType::Qa],
        ActionKind::DeploymentPlanning => vec![AgentType::Developer, AgentType::Architect],
        ActionKind::CreateAgent
        | ActionKind::AgentDiscussion
        | ActionKind::WebResearch
        | ActionKind::DeepAnalysis
        | ActionKind::Other => Vec::new(),
    }
}
