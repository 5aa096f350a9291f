//! Round state: the current round, its plan and the bounded history.

use super::plan::{RoundPhase, RoundPlan};
use super::record::{Exchange, RoundHistory, RoundRecord};
use super::transition::{RoundInput, RoundPolicy, TransitionEvaluation, TransitionReason};
use crate::conversation::ProgressSnapshot;
use crate::text::TextAnalyzer;
use serde::{Deserialize, Serialize};

/// Result of closing a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round: u32,
    pub evaluation: TransitionEvaluation,
    pub reason: TransitionReason,
    /// False when the round had no exchanges and was not recorded
    pub advanced: bool,
}

#[derive(Debug, Clone)]
pub struct RoundTransitionManager {
    policy: RoundPolicy,
    current_round: u32,
    history: RoundHistory,
    last_progress: ProgressSnapshot,
    plan: Option<RoundPlan>,
}

impl RoundTransitionManager {
    pub fn new(policy: RoundPolicy, history_limit: usize) -> Self {
        Self {
            policy,
            current_round: 1,
            history: RoundHistory::new(history_limit),
            last_progress: ProgressSnapshot::default(),
            plan: None,
        }
    }

    pub fn policy(&self) -> &RoundPolicy {
        &self.policy
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn phase(&self) -> RoundPhase {
        RoundPhase::for_round(self.current_round)
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    /// Plan for the current round, if one was set
    pub fn plan(&self) -> Option<&RoundPlan> {
        self.plan
            .as_ref()
            .filter(|p| p.round_number == self.current_round)
    }

    /// Whether the current round still needs a plan
    pub fn needs_plan(&self) -> bool {
        self.plan().is_none()
    }

    pub fn set_plan(&mut self, plan: RoundPlan) {
        self.plan = Some(plan);
    }

    /// Close the current round.
    ///
    /// A round without exchanges is evaluated but neither recorded nor
    /// advanced, so the round number only moves forward after real work.
    pub fn complete_round(
        &mut self,
        exchanges: Vec<Exchange>,
        progress: ProgressSnapshot,
        analyzer: &dyn TextAnalyzer,
    ) -> RoundOutcome {
        let round = self.current_round;
        let plan = self
            .plan()
            .cloned()
            .unwrap_or_else(|| RoundPlan::fallback(round));

        let assessment = self.policy.assess(
            &RoundInput {
                plan: &plan,
                exchanges: &exchanges,
                history: &self.history,
                previous_progress: self.last_progress,
                current_progress: progress,
            },
            analyzer,
        );
        let reason = self.policy.decide(&assessment.evaluation, round);

        if exchanges.is_empty() {
            return RoundOutcome {
                round,
                evaluation: assessment.evaluation,
                reason,
                advanced: false,
            };
        }

        self.history.push(RoundRecord {
            round,
            exchanges,
            metrics: assessment.metrics,
            insight_tags: assessment.insight_tags,
        });
        self.last_progress = progress;
        self.current_round += 1;

        RoundOutcome {
            round,
            evaluation: assessment.evaluation,
            reason,
            advanced: true,
        }
    }
}
