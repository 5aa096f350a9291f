use super::*;
use crate::config::{DiscussionMode, OrchestratorParams};
use crate::ports::conversation_logger::EventKind;
use crate::ports::knowledge_search::{SearchError, SearchResult};
use crate::ports::llm_gateway::{GatewayError, OracleRequest, OracleResponse, TokenUsage};
use crate::ports::memory_store::InMemoryStore;
use async_trait::async_trait;
use council_domain::{StopReason, TierLimits};
use std::sync::Mutex;

/// Answers by recognizing which prompt it was sent
struct ScriptedOracle {
    action: String,
    vote: String,
    failing: Vec<String>,
    cancel_on_vote: Option<CancellationToken>,
}

impl ScriptedOracle {
    fn new() -> Self {
        Self {
            action: r#"{"action": "agent_discussion", "priority": 6, "rationale": "talk"}"#.to_string(),
            vote: r#"{"shouldContinue": false, "confidence": 0.9, "completionPercentage": 90}"#
                .to_string(),
            failing: Vec::new(),
            cancel_on_vote: None,
        }
    }

    fn with_action(mut self, action: &str) -> Self {
        self.action = action.to_string();
        self
    }

    fn with_vote(mut self, vote: &str) -> Self {
        self.vote = vote.to_string();
        self
    }

    fn failing(mut self, model: &str) -> Self {
        self.failing.push(model.to_string());
        self
    }

    fn answer(&self, prompt: &str) -> String {
        if prompt.contains("Analyze the following objective") {
            r#"{"complexity": 6, "requiredCapabilities": ["security"], "suggestedAgents": ["architect", "security"], "estimatedScope": "medium"}"#.to_string()
        } else if prompt.contains("Plan this round") {
            r#"{"focus": "Pick the limiting algorithm", "objectives": ["Compare algorithms"], "approach": "Debate", "questions": []}"#.to_string()
        } else if prompt.contains("Choose the single most useful next action") {
            self.action.clone()
        } else if prompt.contains("Should the discussion continue") {
            if let Some(token) = &self.cancel_on_vote {
                token.cancel();
            }
            self.vote.clone()
        } else if prompt.contains("Which specialist sub-agents") {
            r#"{"subAgents": [{"type": "security", "specialization": "abuse detection", "purpose": "Find bypasses of the limiter"}]}"#.to_string()
        } else if prompt.contains("The discussion is over") {
            "We decided to use a token bucket per tenant. We recommend storing counters in Redis."
                .to_string()
        } else {
            "We decided to use a token bucket per tenant. I agree with this because bursts stay bounded and the counters are cheap to keep.".to_string()
        }
    }
}

#[async_trait]
impl LlmGateway for ScriptedOracle {
    async fn generate(&self, request: &OracleRequest) -> Result<OracleResponse, GatewayError> {
        if self.failing.iter().any(|m| m == &request.model_id) {
            return Err(GatewayError::ConnectionError("refused".to_string()));
        }
        Ok(OracleResponse {
            content: self.answer(&request.prompt),
            model: request.model_id.clone(),
            provider: "test".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
            },
            cost: 0.0,
        })
    }

    async fn available_models(&self) -> Result<Vec<ModelDescriptor>, GatewayError> {
        Ok(models())
    }
}

#[derive(Default)]
struct RecordingLogger {
    events: Mutex<Vec<ConversationEvent>>,
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

struct StaticSearch;

#[async_trait]
impl KnowledgeSearch for StaticSearch {
    async fn search(&self, query: &str, _max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        Ok(vec![SearchResult {
            title: format!("About {query}"),
            url: "https://example.org/limits".to_string(),
            snippet: "Sliding windows smooth bursts".to_string(),
        }])
    }
}

fn models() -> Vec<ModelDescriptor> {
    vec![
        ModelDescriptor::new("alpha", "anthropic").with_quality(9.0),
        ModelDescriptor::new("beta", "openai").with_quality(8.5),
    ]
}

fn config() -> CouncilConfig {
    CouncilConfig::default()
        .with_models(models())
        .with_orchestrator(OrchestratorParams::default().with_seed(7))
}

fn orchestrator(gateway: ScriptedOracle) -> ConversationOrchestrator {
    ConversationOrchestrator::new(Arc::new(gateway), config()).unwrap()
}

#[tokio::test]
async fn test_vote_to_stop_ends_after_first_iteration() {
    let output = orchestrator(ScriptedOracle::new())
        .execute(DiscussionInput::new("Design a rate limiter for the public API"))
        .await
        .unwrap();

    assert_eq!(output.iterations, 1);
    assert_eq!(output.end, DiscussionEnd::Voted(StopReason::LowContinueRatio));
    assert_eq!(output.actions, vec![ActionKind::AgentDiscussion]);
    assert!(output.agents.len() >= 2);
    assert!(output.agents.iter().all(|a| a.assigned_model.is_some()));
    assert_eq!(output.exchanges.len(), output.agents.len());
    assert_eq!(output.objective.complexity, 6);
    assert_eq!(output.rounds_completed, 1);
    assert!(!output.conclusion.is_fallback);
    assert_eq!(output.conclusion.sources, vec!["alpha", "beta"]);
    assert!(output.total_usage.calls > 0);
    assert!(output.tier_stats.active >= 2);
}

#[tokio::test]
async fn test_failing_models_degrade_to_fallbacks() {
    let gateway = ScriptedOracle::new().failing("alpha").failing("beta");
    let output = orchestrator(gateway)
        .execute(DiscussionInput::new("Design a rate limiter").with_mode(DiscussionMode::Quick))
        .await
        .unwrap();

    assert_eq!(output.iterations, 3);
    assert_eq!(output.end, DiscussionEnd::IterationLimit);
    assert!(output.exchanges.iter().all(|e| e.is_fallback));
    assert!(output.conclusion.is_fallback);
    assert!(output.last_tally.as_ref().is_some_and(|t| t.is_empty()));
    assert_eq!(output.total_usage.failures, output.total_usage.calls);
}

#[tokio::test]
async fn test_one_failing_model_is_left_out_of_votes() {
    let gateway = ScriptedOracle::new().failing("beta");
    let output = orchestrator(gateway)
        .execute(DiscussionInput::new("Design a rate limiter"))
        .await
        .unwrap();

    let tally = output.last_tally.unwrap();
    assert_eq!(tally.votes.len(), 1);
    assert_eq!(tally.votes[0].model_name, "alpha");
    assert_eq!(output.conclusion.sources, vec!["alpha"]);
}

#[tokio::test]
async fn test_empty_objective_is_rejected() {
    let result = orchestrator(ScriptedOracle::new())
        .execute(DiscussionInput::new("   "))
        .await;
    assert!(matches!(result, Err(OrchestratorError::InvalidObjective(_))));
}

#[tokio::test]
async fn test_empty_catalog_has_no_providers() {
    let result = ConversationOrchestrator::new(Arc::new(ScriptedOracle::new()), CouncilConfig::default());
    assert!(matches!(result, Err(OrchestratorError::NoProviders)));

    let discovered =
        ConversationOrchestrator::discover(Arc::new(ScriptedOracle::new()), CouncilConfig::default())
            .await
            .unwrap();
    assert_eq!(discovered.catalog().len(), 2);
}

#[tokio::test]
async fn test_cancellation_mid_run() {
    let token = CancellationToken::new();
    let gateway = ScriptedOracle {
        cancel_on_vote: Some(token.clone()),
        ..ScriptedOracle::new()
    };
    let result = orchestrator(gateway)
        .execute_with_progress(DiscussionInput::new("Design a rate limiter"), &NoProgress, token)
        .await;
    assert!(matches!(result, Err(OrchestratorError::Cancelled)));
}

#[tokio::test]
async fn test_events_carry_conversation_id() {
    let logger = Arc::new(RecordingLogger::default());
    let orchestrator = orchestrator(ScriptedOracle::new()).with_logger(logger.clone());
    orchestrator
        .execute(DiscussionInput::new("Design a rate limiter").with_conversation_id("conv-test"))
        .await
        .unwrap();

    let events = logger.events.lock().unwrap();
    assert!(events.iter().all(|e| e.metadata["conversation_id"] == "conv-test"));
    assert_eq!(events[0].payload["event"], "discussion_started");
    assert_eq!(events.last().unwrap().payload["event"], "discussion_completed");
    assert!(events.iter().any(|e| e.kind == EventKind::AgentResponse));
}

#[tokio::test]
async fn test_web_research_stores_findings() {
    let gateway = ScriptedOracle::new().with_action(
        r#"{"action": "web_research", "priority": 9, "details": "rate limiting algorithms"}"#,
    );
    let store = Arc::new(InMemoryStore::new());
    let logger = Arc::new(RecordingLogger::default());
    let output = orchestrator(gateway)
        .with_search(Arc::new(StaticSearch))
        .with_store(store.clone())
        .with_logger(logger.clone())
        .execute(DiscussionInput::new("Design a rate limiter"))
        .await
        .unwrap();

    assert_eq!(output.actions, vec![ActionKind::WebResearch]);
    assert_eq!(output.exchanges.len(), 1);
    let researcher = &output.exchanges[0].agent_id;
    assert!(output.memory_stats[researcher].counts[&council_domain::MemoryKind::Semantic] >= 1);
    assert!(!store.is_empty());

    let events = logger.events.lock().unwrap();
    let tool = events.iter().find(|e| e.kind == EventKind::ToolUsage).unwrap();
    assert_eq!(tool.payload["query"], "rate limiting algorithms");
}

#[tokio::test]
async fn test_create_agent_spawns_sub_agents() {
    let gateway = ScriptedOracle::new()
        .with_action(r#"{"action": "create_agent", "priority": 8, "details": "abuse cases"}"#);
    let mut config = config();
    config.tiers = TierLimits {
        max_concurrent_per_model: 10,
        ..TierLimits::default()
    };
    let output = ConversationOrchestrator::new(Arc::new(gateway), config)
        .unwrap()
        .execute(DiscussionInput::new("Design a rate limiter"))
        .await
        .unwrap();

    let subs: Vec<&Agent> = output.agents.iter().filter(|a| a.is_sub_agent).collect();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].agent_type, AgentType::Security);
    assert!(subs[0].parent_agent_id.is_some());
    assert_eq!(output.exchanges.len(), 1);
    assert_eq!(output.exchanges[0].agent_id, subs[0].id);
}

#[tokio::test]
async fn test_round_ceiling_ends_without_vote() {
    let mut config = config();
    config.rounds.max_rounds = 1;
    let output = ConversationOrchestrator::new(Arc::new(ScriptedOracle::new()), config)
        .unwrap()
        .execute(DiscussionInput::new("Design a rate limiter"))
        .await
        .unwrap();

    assert_eq!(output.end, DiscussionEnd::MaxRoundsReached);
    assert_eq!(output.iterations, 1);
    assert!(output.last_tally.is_none());
}

#[tokio::test]
async fn test_continue_votes_stop_at_iteration_ceiling() {
    let gateway = ScriptedOracle::new()
        .with_vote(r#"{"shouldContinue": true, "confidence": 0.9, "completionPercentage": 20}"#);
    let config = config().with_orchestrator(
        OrchestratorParams::default()
            .with_seed(7)
            .with_max_iterations(4),
    );
    let output = ConversationOrchestrator::new(Arc::new(gateway), config)
        .unwrap()
        .execute(DiscussionInput::new("Design a rate limiter"))
        .await
        .unwrap();

    assert_eq!(output.end, DiscussionEnd::Voted(StopReason::IterationCeiling));
    assert_eq!(output.iterations, 2);
    assert_eq!(output.rounds_completed, 2);
    assert!(output.last_tally.unwrap().weighted_ratio > 0.99);
}
