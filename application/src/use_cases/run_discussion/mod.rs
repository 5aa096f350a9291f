//! Run Discussion use case
//!
//! Drives one council discussion from objective to conclusion:
//!
//! | Stage                 | What happens                                         |
//! |-----------------------|------------------------------------------------------|
//! | 1. Analyzing          | every catalog model analyzes the objective           |
//! | 2. Selecting agents   | role templates scored, agents bound to model tiers   |
//! | 3. Planning           | the current round gets a plan (once per round)       |
//! | 4. Acting             | sampled models suggest an action, the best one runs  |
//! | 5. Evaluating         | round transition check, then the continuation vote   |
//! | 6. Concluding         | narratives from every model merged into a conclusion |
//!
//! Stages 3-5 repeat until the vote says stop, the round policy reaches its
//! terminal round, or the iteration limit is hit. Oracle failures never
//! abort the run; they degrade to fallback text. Only cancellation (and an
//! empty model catalog or objective up front) ends a run with an error.

mod actions;
mod conclusion;
mod consensus;
mod events;
mod memory;
mod oracle;
mod planning;
mod registry;
mod types;

pub use events::EventQueue;
pub use memory::MemoryService;
pub use oracle::{ModelUsage, ResilientOracle, UsageLedger};
pub use registry::SharedModelRegistry;
pub use types::{
    DiscussionEnd, DiscussionInput, DiscussionOutput, OrchestratorError, new_conversation_id,
};

use crate::config::CouncilConfig;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::knowledge_search::{KnowledgeSearch, NoKnowledgeSearch};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::memory_store::{MemoryStore, NoMemoryStore};
use crate::ports::progress::{NoProgress, OrchestrationProgress};
use crate::use_cases::shared::check_cancelled;
use council_domain::{
    ActionKind, Agent, AgentType, ContinuationTally, ConversationMemory, DiscussionStage,
    DynamicAgentSelector, ModelDescriptor, ModelRegistry, NaiveTextAnalyzer, Objective,
    RoundTransitionManager, TextAnalyzer,
};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Use case for running a council discussion
#[derive(Clone)]
pub struct ConversationOrchestrator {
    gateway: Arc<dyn LlmGateway>,
    search: Arc<dyn KnowledgeSearch>,
    store: Arc<dyn MemoryStore>,
    logger: Arc<dyn ConversationLogger>,
    analyzer: Arc<dyn TextAnalyzer>,
    config: CouncilConfig,
    catalog: Vec<ModelDescriptor>,
}

impl ConversationOrchestrator {
    /// Build an orchestrator over the configured model catalog.
    ///
    /// Invalid descriptors are skipped with a warning; an empty catalog is
    /// [`OrchestratorError::NoProviders`].
    pub fn new(gateway: Arc<dyn LlmGateway>, config: CouncilConfig) -> Result<Self, OrchestratorError> {
        let catalog: Vec<ModelDescriptor> = config
            .models
            .iter()
            .filter(|model| match model.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("Skipping model {}: {}", model.id, e);
                    false
                }
            })
            .cloned()
            .collect();
        if catalog.is_empty() {
            return Err(OrchestratorError::NoProviders);
        }
        Ok(Self {
            gateway,
            search: Arc::new(NoKnowledgeSearch),
            store: Arc::new(NoMemoryStore),
            logger: Arc::new(NoConversationLogger),
            analyzer: Arc::new(NaiveTextAnalyzer::new()),
            config,
            catalog,
        })
    }

    /// Like [`new`](Self::new), asking the gateway for its models when the
    /// configuration lists none
    pub async fn discover(
        gateway: Arc<dyn LlmGateway>,
        mut config: CouncilConfig,
    ) -> Result<Self, OrchestratorError> {
        if config.models.is_empty() {
            match gateway.available_models().await {
                Ok(models) => config.models = models,
                Err(e) => warn!("Could not list gateway models: {}", e),
            }
        }
        Self::new(gateway, config)
    }

    pub fn with_search(mut self, search: Arc<dyn KnowledgeSearch>) -> Self {
        self.search = search;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn MemoryStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn TextAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn catalog(&self) -> &[ModelDescriptor] {
        &self.catalog
    }

    pub fn config(&self) -> &CouncilConfig {
        &self.config
    }

    /// Run a discussion without progress reporting or external cancellation
    pub async fn execute(&self, input: DiscussionInput) -> Result<DiscussionOutput, OrchestratorError> {
        self.execute_with_progress(input, &NoProgress, CancellationToken::new())
            .await
    }

    pub async fn execute_with_progress(
        &self,
        input: DiscussionInput,
        progress: &dyn OrchestrationProgress,
        token: CancellationToken,
    ) -> Result<DiscussionOutput, OrchestratorError> {
        let text = input.objective.trim().to_string();
        if text.is_empty() {
            return Err(OrchestratorError::InvalidObjective(
                "objective is empty".to_string(),
            ));
        }
        check_cancelled(&token)?;

        info!(
            "Starting discussion {} ({} mode, {} models)",
            input.conversation_id,
            input.mode,
            self.catalog.len()
        );
        let (events, drain) =
            EventQueue::spawn_drain(input.conversation_id.clone(), Arc::clone(&self.logger));

        let registry = match self.config.orchestrator.seed {
            Some(seed) => ModelRegistry::with_seed(self.catalog.clone(), self.config.tiers.clone(), seed),
            None => ModelRegistry::new(self.catalog.clone(), self.config.tiers.clone()),
        };
        let mut discussion = Discussion {
            oracle: ResilientOracle::new(
                Arc::clone(&self.gateway),
                self.config.orchestrator.oracle_timeout,
            ),
            search: Arc::clone(&self.search),
            analyzer: Arc::clone(&self.analyzer),
            config: &self.config,
            progress,
            token: &token,
            events,
            catalog: self.catalog.clone(),
            registry: SharedModelRegistry::new(registry),
            selector: DynamicAgentSelector::new(self.config.selector),
            rounds: RoundTransitionManager::new(self.config.rounds, self.config.history_limit),
            conversation: ConversationMemory::new(),
            memory: MemoryService::new(
                Arc::clone(&self.store),
                self.config.memory,
                Arc::clone(&self.analyzer),
            ),
            agents: Vec::new(),
            objective: Objective::unanalyzed(text.clone(), input.complexity),
            stage: DiscussionStage::AnalyzingObjective,
            actions: Vec::new(),
            sub_agent_seq: 0,
        };

        let result = discussion.run(&input).await;
        if result.is_err() {
            let released = discussion.registry.release_all();
            debug!("Released {} model assignments after an aborted run", released);
            discussion.events.push(ConversationEvent::system(json!({
                "event": "discussion_aborted",
            })));
        }
        drop(discussion);
        match drain.await {
            Ok(count) => debug!("Logged {} conversation events", count),
            Err(e) => warn!("Conversation log drain failed: {}", e),
        }
        result
    }
}

/// State of one running discussion
pub(super) struct Discussion<'a> {
    pub(super) oracle: ResilientOracle,
    pub(super) search: Arc<dyn KnowledgeSearch>,
    pub(super) analyzer: Arc<dyn TextAnalyzer>,
    pub(super) config: &'a CouncilConfig,
    pub(super) progress: &'a dyn OrchestrationProgress,
    pub(super) token: &'a CancellationToken,
    pub(super) events: EventQueue,
    pub(super) catalog: Vec<ModelDescriptor>,
    pub(super) registry: SharedModelRegistry,
    pub(super) selector: DynamicAgentSelector,
    pub(super) rounds: RoundTransitionManager,
    pub(super) conversation: ConversationMemory,
    pub(super) memory: MemoryService,
    pub(super) agents: Vec<Agent>,
    pub(super) objective: Objective,
    pub(super) stage: DiscussionStage,
    pub(super) actions: Vec<ActionKind>,
    pub(super) sub_agent_seq: usize,
}

impl Discussion<'_> {
    async fn run(&mut self, input: &DiscussionInput) -> Result<DiscussionOutput, OrchestratorError> {
        self.events.push(ConversationEvent::system(json!({
            "event": "discussion_started",
            "objective": input.objective.trim(),
            "mode": input.mode.to_string(),
            "models": self.catalog.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
        })));

        self.progress.on_stage(self.stage);
        self.analyze_objective(input.complexity).await?;

        self.advance(DiscussionStage::SelectingAgents);
        self.select_agents().await?;

        let limit = self.config.orchestrator.iteration_limit(input.mode);
        let stop_policy = self.config.orchestrator.stop_policy();
        let mut end = DiscussionEnd::IterationLimit;
        let mut last_tally: Option<ContinuationTally> = None;
        let mut iterations = 0;

        while iterations < limit {
            check_cancelled(self.token)?;
            iterations += 1;
            debug!("Iteration {}/{}", iterations, limit);

            self.advance(DiscussionStage::Planning);
            let plan = self.plan_round().await?;

            self.advance(DiscussionStage::Acting);
            let action = self.choose_action(&plan).await?;
            self.actions.push(action.kind);
            let exchanges = self.dispatch(&action, &plan).await?;

            self.advance(DiscussionStage::Evaluating);
            let outcome = self.evaluate_round(exchanges).await?;
            if outcome.reason.is_terminal() {
                info!("Round policy ended the discussion after round {}", outcome.round);
                end = DiscussionEnd::MaxRoundsReached;
                break;
            }

            let (tally, stop) = self
                .continuation_vote(iterations, &stop_policy, outcome.reason)
                .await?;
            last_tally = Some(tally);
            if let Some(reason) = stop {
                end = DiscussionEnd::Voted(reason);
                break;
            }
        }
        info!("Discussion loop ended: {}", end.describe());

        self.advance(DiscussionStage::Concluding);
        let conclusion = self.conclude().await?;

        let tier_stats = self.registry.stats();
        let released = self.registry.release_all();
        debug!("Released {} model assignments", released);
        let written = self.memory.flush(self.token).await?;
        debug!("Flushed memory for {} agents", written);

        self.advance(DiscussionStage::Done);
        self.events.push(ConversationEvent::system(json!({
            "event": "discussion_completed",
            "iterations": iterations,
            "end": end.describe(),
        })));

        Ok(DiscussionOutput {
            conversation_id: self.events.conversation_id().to_string(),
            objective: self.objective.clone(),
            agents: self.agents.clone(),
            iterations,
            rounds_completed: self.rounds.current_round().saturating_sub(1),
            end,
            actions: self.actions.clone(),
            last_tally,
            conclusion,
            exchanges: self.conversation.exchanges().to_vec(),
            usage: self.oracle.ledger().snapshot(),
            total_usage: self.oracle.ledger().totals(),
            tier_stats,
            memory_stats: self.memory.stats(),
        })
    }

    /// Move to the next stage and tell the progress port
    pub(super) fn advance(&mut self, next: DiscussionStage) {
        if next == self.stage {
            return;
        }
        if !self.stage.can_advance_to(next) {
            warn!("Unexpected stage transition {} -> {}", self.stage, next);
        }
        self.stage = next;
        self.progress.on_stage(next);
    }

    /// First agent of a preferred role, else the first main agent
    pub(super) fn lead_for(&self, preferred: &[AgentType]) -> Option<Agent> {
        preferred
            .iter()
            .find_map(|role| self.agents.iter().find(|a| &a.agent_type == role))
            .or_else(|| self.agents.iter().find(|a| !a.is_sub_agent))
            .or_else(|| self.agents.first())
            .cloned()
    }

    /// Model an agent speaks through
    pub(super) fn model_for(&self, agent: &Agent) -> String {
        agent
            .assigned_model
            .clone()
            .unwrap_or_else(|| self.planner_model().id)
    }

    /// Highest-quality catalog model; the first one wins ties
    pub(super) fn planner_model(&self) -> ModelDescriptor {
        self.catalog
            .iter()
            .fold(None::<&ModelDescriptor>, |best, model| match best {
                Some(current) if current.quality_score >= model.quality_score => Some(current),
                _ => Some(model),
            })
            .cloned()
            .unwrap_or_else(|| ModelDescriptor::new("unknown", "none"))
    }
}

#[cfg(test)]
mod tests;
