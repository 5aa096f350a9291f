//! Objective analysis, agent selection, round planning and action choice.

use super::{Discussion, OrchestratorError};
use crate::ports::conversation_logger::ConversationEvent;
use crate::ports::llm_gateway::OracleRequest;
use crate::use_cases::shared::check_cancelled;
use council_domain::{
    ActionSuggestion, AgentId, AgentType, MemoryKind, Objective, ObjectiveAnalysis,
    PromptTemplate, RoundPlan, StoreRequest, TopicAnalysis, now_millis, select_action,
};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Exchanges shown to the planner
const PLANNING_CONTEXT: usize = 4;

impl Discussion<'_> {
    /// Ask every catalog model to analyze the objective and fold the answers.
    ///
    /// Failed calls are left out; unparseable answers count with default
    /// values. With no answers at all the objective stays unanalyzed.
    pub(super) async fn analyze_objective(
        &mut self,
        complexity_hint: Option<u8>,
    ) -> Result<(), OrchestratorError> {
        check_cancelled(self.token)?;
        let text = self.objective.main_objective.clone();
        let prompt = PromptTemplate::objective_analysis(&text, complexity_hint);
        let requests = self
            .catalog
            .iter()
            .map(|model| OracleRequest::new(&model.id, prompt.clone()))
            .collect();
        let responses = self.oracle.ask_all(requests).await;
        check_cancelled(self.token)?;

        let analyses: Vec<ObjectiveAnalysis> = self
            .catalog
            .iter()
            .zip(&responses)
            .filter(|(_, response)| !response.is_fallback())
            .map(|(model, response)| ObjectiveAnalysis::parse(&model.id, &response.content))
            .collect();
        let unparsed = analyses.iter().filter(|a| a.is_fallback).count();
        if unparsed > 0 {
            debug!("{} objective analyses used default values", unparsed);
        }

        self.objective = Objective::synthesize(text, &analyses, complexity_hint);
        info!(
            "Objective analyzed by {}/{} models: complexity {}, scope {}",
            analyses.len(),
            self.catalog.len(),
            self.objective.complexity,
            self.objective.estimated_scope
        );
        self.events.push(ConversationEvent::system(json!({
            "event": "objective_analyzed",
            "complexity": self.objective.complexity,
            "scope": self.objective.estimated_scope.as_str(),
            "suggested_agents": self.objective.suggested_agents,
            "analyses": analyses.len(),
        })));
        self.progress.on_objective(&self.objective);
        Ok(())
    }

    /// Compose the working set of agents and bind each to a model.
    ///
    /// An agent whose tier cascade finds no free model is skipped.
    pub(super) async fn select_agents(&mut self) -> Result<(), OrchestratorError> {
        let topic = TopicAnalysis::from_objective(&self.objective);
        let selected = self.selector.select(&topic);
        let complexity = self.objective.complexity_level();

        let mut sequence: BTreeMap<AgentType, usize> = BTreeMap::new();
        let mut joined = Vec::new();
        for choice in selected {
            check_cancelled(self.token)?;
            let template = choice.template;
            let seq = sequence.entry(template.agent_type.clone()).or_default();
            *seq += 1;
            let mut agent = template
                .to_agent(AgentId::for_role(&template.agent_type, *seq))
                .with_purpose(format!(
                    "Contribute {} expertise to: {}",
                    template.specialization, self.objective.main_objective
                ));

            let Some(assignment) = self.registry.assign(&agent, complexity) else {
                warn!("No model available for {}, skipping", agent.id);
                continue;
            };
            debug!(
                "{} assigned {} ({} tier, score {:.2}{})",
                agent.id,
                assignment.model_id,
                assignment.tier,
                choice.score.total,
                if choice.backfilled { ", backfilled" } else { "" }
            );
            agent.assigned_model = Some(assignment.model_id);

            let now = now_millis();
            self.memory.open(&agent.id, now, self.token).await?;
            self.memory
                .remember(
                    &agent.id,
                    MemoryKind::Working,
                    &format!("Objective: {}", self.objective.main_objective),
                    StoreRequest::from_source("user").with_category("objective"),
                    now,
                    self.token,
                )
                .await?;
            joined.push(agent);
        }

        info!(
            "Council formed: {}",
            joined
                .iter()
                .map(|a| a.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.events.push(ConversationEvent::system(json!({
            "event": "agents_selected",
            "agents": joined.iter().map(|a| json!({
                "id": a.id.as_str(),
                "type": a.agent_type.as_str(),
                "model": a.assigned_model,
            })).collect::<Vec<_>>(),
        })));
        self.progress.on_agents_joined(&joined);
        self.agents.extend(joined);
        Ok(())
    }

    /// The plan for the current round, asking the planner model only when
    /// the round has none yet
    pub(super) async fn plan_round(&mut self) -> Result<RoundPlan, OrchestratorError> {
        check_cancelled(self.token)?;
        if let Some(plan) = self.rounds.plan() {
            return Ok(plan.clone());
        }

        let round = self.rounds.current_round();
        let phase = self.rounds.phase();
        let prompt = PromptTemplate::round_plan(
            &self.objective,
            round,
            phase.as_str(),
            &self.conversation.recent_substantive(PLANNING_CONTEXT),
            self.conversation.open_questions(),
        );
        let planner = self.planner_model();
        let response = self.oracle.ask(OracleRequest::new(&planner.id, prompt)).await;
        check_cancelled(self.token)?;

        let plan = if response.is_fallback() {
            RoundPlan::fallback(round)
        } else {
            RoundPlan::parse(round, &response.content)
        };
        info!("Round {} ({}): {}", round, phase, plan.focus);
        self.rounds.set_plan(plan.clone());
        self.events.push(ConversationEvent::system(json!({
            "event": "round_planned",
            "round": round,
            "phase": phase.as_str(),
            "focus": plan.focus,
            "fallback": plan.is_fallback,
        })));
        self.progress.on_round_start(&plan);
        Ok(plan)
    }

    /// Ask a small sample of models for the next action; highest priority wins
    pub(super) async fn choose_action(
        &mut self,
        plan: &RoundPlan,
    ) -> Result<ActionSuggestion, OrchestratorError> {
        check_cancelled(self.token)?;
        let prompt = PromptTemplate::action_suggestion(
            &self.objective,
            plan,
            &self.conversation.recent_substantive(PLANNING_CONTEXT),
        );
        let sample: Vec<String> = self
            .catalog
            .iter()
            .take(self.config.orchestrator.action_sample_size.max(1))
            .map(|m| m.id.clone())
            .collect();
        let requests = sample
            .iter()
            .map(|model| OracleRequest::new(model, prompt.clone()))
            .collect();
        let responses = self.oracle.ask_all(requests).await;
        check_cancelled(self.token)?;

        let suggestions: Vec<ActionSuggestion> = sample
            .iter()
            .zip(&responses)
            .filter(|(_, response)| !response.is_fallback())
            .map(|(model, response)| ActionSuggestion::parse(model, &response.content))
            .collect();
        let action = select_action(&suggestions)
            .cloned()
            .unwrap_or_else(|| ActionSuggestion::fallback("council"));

        info!(
            "Action: {} (priority {}, from {})",
            action.kind, action.priority, action.model
        );
        self.events.push(ConversationEvent::system(json!({
            "event": "action_selected",
            "round": plan.round_number,
            "action": action.kind.as_str(),
            "priority": action.priority,
            "details": action.details,
            "suggestions": suggestions.len(),
        })));
        self.progress.on_action(&action);
        Ok(action)
    }
}
