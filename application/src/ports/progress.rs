//! Progress notification port
//!
//! [`OrchestrationProgress`] is an output port the presentation layer
//! implements to show a discussion as it unfolds. All methods have default
//! no-op implementations, so implementers only override what they display.

use crate::ports::llm_gateway::OracleResponse;
use council_domain::{
    ActionSuggestion, Agent, Conclusion, ContinuationTally, DiscussionStage, Objective,
    RoundOutcome, RoundPlan, StopReason,
};

pub trait OrchestrationProgress: Send + Sync {
    /// Called when the discussion enters a new stage
    fn on_stage(&self, _stage: DiscussionStage) {}

    /// Called once the objective has been synthesized
    fn on_objective(&self, _objective: &Objective) {}

    /// Called when agents (main or sub) join the discussion
    fn on_agents_joined(&self, _agents: &[Agent]) {}

    /// Called when a round starts with its plan
    fn on_round_start(&self, _plan: &RoundPlan) {}

    /// Called when an action has been chosen for the round
    fn on_action(&self, _action: &ActionSuggestion) {}

    /// Called for every agent contribution
    fn on_agent_response(&self, _agent: &Agent, _response: &OracleResponse) {}

    /// Called after the round was evaluated
    fn on_round_complete(&self, _outcome: &RoundOutcome) {}

    /// Called after each continuation vote
    fn on_vote(&self, _iteration: u32, _tally: &ContinuationTally, _stop: Option<StopReason>) {}

    /// Called with the final conclusion
    fn on_conclusion(&self, _conclusion: &Conclusion) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl OrchestrationProgress for NoProgress {}
