//! Domain layer for agent-council
//!
//! This crate contains the core orchestration logic, entities, and value
//! objects. It performs no I/O: time is passed in as milliseconds and
//! randomness as an injected generator.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A pool of role-specialized agents, each bound to a model from the oracle
//! catalog, discusses an objective round by round:
//!
//! - **Objective**: synthesized from several models' structured analyses
//! - **Selection**: role templates scored by expertise, performance and diversity
//! - **Tiers**: models classified as premium / balanced / fast / economical and
//!   assigned to agents under concurrency caps
//! - **Rounds**: phase-aware plans and a transition policy deciding when to move on
//! - **Quorum**: confidence-weighted continuation votes from a diverse model sample
//! - **Memory**: a layered per-agent memory bank with a forgetting curve

pub mod action;
pub mod agent;
pub mod conclusion;
pub mod conversation;
pub mod core;
pub mod memory;
pub mod objective;
pub mod prompt;
pub mod quorum;
pub mod round;
pub mod selection;
pub mod text;
pub mod tier;

// Re-export commonly used types
pub use action::{ActionKind, ActionSuggestion, select_action};
pub use agent::{
    Agent, AgentId, AgentType, Complexity, SubAgentSpec, default_sub_agent_specs,
    infer_capabilities, parse_sub_agent_specs,
};
pub use conclusion::{Conclusion, Narrative, merge_narratives, structured_summary};
pub use conversation::{ConversationMemory, DiscussionStage, ProgressSnapshot};
pub use core::{
    error::DomainError,
    model::ModelDescriptor,
    output_format::OutputFormat,
    time::now_millis,
    validation::{ConfigIssue, ConfigIssueCode, Severity, has_errors},
};
pub use memory::{
    AgentMemoryBank, MemoryCapacities, MemoryIndexes, MemoryItem, MemoryKind, MemorySnapshot,
    MemoryStats, RetrieveOptions, StoreRequest,
};
pub use objective::{Objective, ObjectiveAnalysis, Scope};
pub use prompt::PromptTemplate;
pub use quorum::{ConsensusVote, ContinuationTally, StopPolicy, StopReason, select_voters};
pub use round::{
    DepthRequirement, Exchange, RoundOutcome, RoundPhase, RoundPlan, RoundPolicy,
    RoundTransitionManager, TransitionReason,
};
pub use selection::{DynamicAgentSelector, SelectorLimits, TopicAnalysis};
pub use text::{NaiveTextAnalyzer, TextAnalyzer};
pub use tier::{ModelAssignment, ModelRegistry, ModelTier, TierLimits, TierRoster, TierStats};
