//! Type definitions for the discussion use case.

use super::oracle::ModelUsage;
use crate::config::DiscussionMode;
use crate::ports::llm_gateway::GatewayError;
use council_domain::{
    ActionKind, Agent, AgentId, Conclusion, ContinuationTally, Exchange, MemoryStats, Objective,
    StopReason, TierStats,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur while running a discussion
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("No oracle models configured")]
    NoProviders,

    #[error("Invalid objective: {0}")]
    InvalidObjective(String),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl OrchestratorError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrchestratorError::Cancelled)
    }
}

/// Input for one discussion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionInput {
    pub conversation_id: String,
    pub objective: String,
    pub mode: DiscussionMode,
    /// Requester's complexity estimate (1-10), used when analysis fails
    pub complexity: Option<u8>,
}

impl DiscussionInput {
    pub fn new(objective: impl Into<String>) -> Self {
        Self {
            conversation_id: new_conversation_id(),
            objective: objective.into(),
            mode: DiscussionMode::default(),
            complexity: None,
        }
    }

    pub fn with_mode(mut self, mode: DiscussionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_complexity(mut self, complexity: u8) -> Self {
        self.complexity = Some(complexity.clamp(1, 10));
        self
    }

    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = conversation_id.into();
        self
    }
}

/// Time-based id, e.g. `conv-20260119-142501-337`
pub fn new_conversation_id() -> String {
    format!("conv-{}", chrono::Utc::now().format("%Y%m%d-%H%M%S-%3f"))
}

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionEnd {
    /// The continuation vote said stop
    Voted(StopReason),
    /// The round policy hit its terminal round
    MaxRoundsReached,
    /// The iteration ceiling was reached without a stop vote
    IterationLimit,
}

impl DiscussionEnd {
    pub fn describe(&self) -> String {
        match self {
            DiscussionEnd::Voted(reason) => format!("council voted to stop ({})", reason.as_str()),
            DiscussionEnd::MaxRoundsReached => "maximum rounds reached".to_string(),
            DiscussionEnd::IterationLimit => "iteration limit reached".to_string(),
        }
    }
}

/// Everything a finished discussion produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionOutput {
    pub conversation_id: String,
    pub objective: Objective,
    pub agents: Vec<Agent>,
    pub iterations: u32,
    pub rounds_completed: u32,
    pub end: DiscussionEnd,
    pub actions: Vec<ActionKind>,
    pub last_tally: Option<ContinuationTally>,
    pub conclusion: Conclusion,
    pub exchanges: Vec<Exchange>,
    pub usage: BTreeMap<String, ModelUsage>,
    pub total_usage: ModelUsage,
    /// Assignment counts before models were released
    pub tier_stats: TierStats,
    pub memory_stats: BTreeMap<AgentId, MemoryStats>,
}
