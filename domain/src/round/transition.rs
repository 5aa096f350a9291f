//! Round transition evaluation.
//!
//! After each round six signals are computed from the round's exchanges,
//! the bounded history and conversation progress. [`RoundPolicy::decide`]
//! turns them into a [`TransitionReason`] by fixed priority.

use super::plan::RoundPlan;
use super::record::{Exchange, RoundHistory, RoundMetrics, combined_text};
use crate::conversation::ProgressSnapshot;
use crate::text::{Stance, TextAnalyzer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const OBJECTIVE_EVIDENCE_RATIO: f64 = 0.5;
const OBJECTIVES_COMPLETE_RATIO: f64 = 0.7;
const CONSENSUS_RATIO: f64 = 0.8;
const REDUNDANCY_SIMILARITY: f64 = 0.7;
const PROGRESS_RATIO: f64 = 0.3;
const REDUNDANCY_WINDOW: usize = 2;

/// How deep a round must go to count as sufficient
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthRequirement {
    Shallow,
    #[default]
    Medium,
    Deep,
}

impl DepthRequirement {
    pub fn threshold(&self) -> f64 {
        match self {
            DepthRequirement::Shallow => 0.4,
            DepthRequirement::Medium => 0.6,
            DepthRequirement::Deep => 0.8,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DepthRequirement::Shallow => "shallow",
            DepthRequirement::Medium => "medium",
            DepthRequirement::Deep => "deep",
        }
    }
}

impl std::str::FromStr for DepthRequirement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shallow" => Ok(DepthRequirement::Shallow),
            "medium" => Ok(DepthRequirement::Medium),
            "deep" => Ok(DepthRequirement::Deep),
            other => Err(format!("Unknown depth requirement: {}", other)),
        }
    }
}

/// Round count bounds and depth requirement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundPolicy {
    pub min_rounds: u32,
    pub optimal_rounds: u32,
    pub max_rounds: u32,
    pub depth_requirement: DepthRequirement,
}

impl Default for RoundPolicy {
    fn default() -> Self {
        Self {
            min_rounds: 3,
            optimal_rounds: 6,
            max_rounds: 10,
            depth_requirement: DepthRequirement::Medium,
        }
    }
}

/// The six per-round signals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvaluation {
    pub objectives_complete: bool,
    pub sufficient_depth: bool,
    pub new_insights: bool,
    pub consensus_reached: bool,
    pub redundancy: bool,
    pub progress_made: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    Redundancy,
    ObjectivesAchieved,
    InsufficientProgress,
    ConsensusAchieved,
    MaxRoundsReached,
    ContinueExploration,
}

impl TransitionReason {
    pub fn as_str(&self) -> &str {
        match self {
            TransitionReason::Redundancy => "redundancy",
            TransitionReason::ObjectivesAchieved => "objectives_achieved",
            TransitionReason::InsufficientProgress => "insufficient_progress",
            TransitionReason::ConsensusAchieved => "consensus_achieved",
            TransitionReason::MaxRoundsReached => "max_rounds_reached",
            TransitionReason::ContinueExploration => "continue_exploration",
        }
    }

    /// Whether the reason recommends ending the discussion
    pub fn suggests_stop(&self) -> bool {
        !matches!(self, TransitionReason::ContinueExploration)
    }

    /// Reasons that end the discussion regardless of votes
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransitionReason::MaxRoundsReached)
    }
}

impl std::fmt::Display for TransitionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Depth score in [0, 1]:
/// `0.3·min(n/5, 1) + 0.2·min(avg_len/200, 1) + 0.25·follow_up + 0.25·disagreement`
pub fn depth_score(exchanges: &[Exchange], analyzer: &dyn TextAnalyzer) -> f64 {
    if exchanges.is_empty() {
        return 0.0;
    }
    let count = exchanges.len() as f64;
    let avg_len = exchanges
        .iter()
        .map(|e| e.content.chars().count())
        .sum::<usize>() as f64
        / count;
    let has_follow_up = exchanges.iter().any(|e| analyzer.is_follow_up(&e.content));
    let has_disagreement = exchanges
        .iter()
        .any(|e| analyzer.stance(&e.content).disagreements > 0);

    0.3 * (count / 5.0).min(1.0)
        + 0.2 * (avg_len / 200.0).min(1.0)
        + if has_follow_up { 0.25 } else { 0.0 }
        + if has_disagreement { 0.25 } else { 0.0 }
}

/// Share of planned objectives evidenced in the exchanges.
///
/// An objective is evidenced when at least half of its significant words
/// appear in the round text. `None` when the plan has no objectives.
pub fn objective_coverage(
    objectives: &[String],
    exchanges: &[Exchange],
    analyzer: &dyn TextAnalyzer,
) -> Option<f64> {
    if objectives.is_empty() {
        return None;
    }
    let text = combined_text(exchanges);
    let evidenced = objectives
        .iter()
        .filter(|objective| {
            !analyzer.words(objective).is_empty()
                && analyzer.word_overlap(objective, &text) >= OBJECTIVE_EVIDENCE_RATIO
        })
        .count();
    Some(evidenced as f64 / objectives.len() as f64)
}

/// Everything evaluation needs about the round just played
pub struct RoundInput<'a> {
    pub plan: &'a RoundPlan,
    pub exchanges: &'a [Exchange],
    pub history: &'a RoundHistory,
    pub previous_progress: ProgressSnapshot,
    pub current_progress: ProgressSnapshot,
}

/// Evaluation output: the signals plus the metrics and tags to record
#[derive(Debug, Clone, PartialEq)]
pub struct RoundAssessment {
    pub evaluation: TransitionEvaluation,
    pub metrics: RoundMetrics,
    pub insight_tags: BTreeSet<String>,
}

impl RoundPolicy {
    pub fn assess(&self, input: &RoundInput<'_>, analyzer: &dyn TextAnalyzer) -> RoundAssessment {
        let exchanges = input.exchanges;
        let text = combined_text(exchanges);

        let objectives_complete = objective_coverage(&input.plan.objectives, exchanges, analyzer)
            .is_some_and(|coverage| coverage >= OBJECTIVES_COMPLETE_RATIO);

        let depth = depth_score(exchanges, analyzer);
        let sufficient_depth = depth >= self.depth_requirement.threshold();

        let insight_tags: BTreeSet<String> = exchanges
            .iter()
            .flat_map(|e| analyzer.insight_tags(&e.content))
            .collect();
        let seen = input.history.insight_tags();
        let new_tags = insight_tags.difference(&seen).count();

        let stance = exchanges
            .iter()
            .map(|e| analyzer.stance(&e.content))
            .fold(Stance::default(), Stance::merge);
        let consensus = stance.agreement_ratio();
        let consensus_reached = consensus.is_some_and(|ratio| ratio >= CONSENSUS_RATIO);

        let redundancy = !text.trim().is_empty()
            && input
                .history
                .last(REDUNDANCY_WINDOW)
                .any(|r| analyzer.similarity(&text, &r.combined_text()) >= REDUNDANCY_SIMILARITY);

        let flags = input
            .current_progress
            .progress_flags(&input.previous_progress);
        let progress_made =
            flags.iter().filter(|f| **f).count() as f64 / flags.len() as f64 >= PROGRESS_RATIO;

        RoundAssessment {
            evaluation: TransitionEvaluation {
                objectives_complete,
                sufficient_depth,
                new_insights: new_tags > 0,
                consensus_reached,
                redundancy,
                progress_made,
            },
            metrics: RoundMetrics {
                depth,
                consensus: consensus.unwrap_or(0.0),
                insight_count: new_tags,
            },
            insight_tags,
        }
    }

    /// Map the signals to a reason, first match wins:
    /// redundancy without new insights, objectives achieved with depth,
    /// no progress after the minimum, consensus after the optimum, the
    /// round ceiling, otherwise keep exploring.
    pub fn decide(&self, evaluation: &TransitionEvaluation, round: u32) -> TransitionReason {
        if evaluation.redundancy && !evaluation.new_insights {
            TransitionReason::Redundancy
        } else if evaluation.objectives_complete && evaluation.sufficient_depth {
            TransitionReason::ObjectivesAchieved
        } else if !evaluation.progress_made && round > self.min_rounds {
            TransitionReason::InsufficientProgress
        } else if evaluation.consensus_reached && round >= self.optimal_rounds {
            TransitionReason::ConsensusAchieved
        } else if round >= self.max_rounds {
            TransitionReason::MaxRoundsReached
        } else {
            TransitionReason::ContinueExploration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentId, AgentType};
    use crate::round::record::RoundRecord;
    use crate::text::NaiveTextAnalyzer;

    fn exchange(content: &str) -> Exchange {
        Exchange::new(1, AgentId::new("a-1"), AgentType::Analyst, "m", content)
    }

    fn plan(objectives: &[&str]) -> RoundPlan {
        let mut plan = RoundPlan::fallback(1);
        plan.objectives = objectives.iter().map(|s| s.to_string()).collect();
        plan
    }

    #[test]
    fn test_depth_score_components() {
        let analyzer = NaiveTextAnalyzer::new();
        let long = "x".repeat(200);
        let exchanges: Vec<Exchange> = (0..5).map(|_| exchange(&long)).collect();
        assert!((depth_score(&exchanges, &analyzer) - 0.5).abs() < 1e-9);

        let rich = vec![
            exchange("Building on that idea, caching helps."),
            exchange("However, I disagree about the TTL."),
        ];
        let score = depth_score(&rich, &analyzer);
        assert!(score > 0.5 && score <= 1.0);
        assert_eq!(depth_score(&[], &analyzer), 0.0);
    }

    #[test]
    fn test_objective_coverage() {
        let analyzer = NaiveTextAnalyzer::new();
        let exchanges = vec![exchange(
            "We compared eviction policies and measured cache latency.",
        )];
        let objectives = vec![
            "Compare eviction policies".to_string(),
            "Measure cache latency".to_string(),
            "Estimate hosting budget".to_string(),
        ];
        let coverage = objective_coverage(&objectives, &exchanges, &analyzer).unwrap();
        assert!((coverage - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(objective_coverage(&[], &exchanges, &analyzer), None);
    }

    #[test]
    fn test_redundancy_against_recent_history() {
        let analyzer = NaiveTextAnalyzer::new();
        let text = "Caching reduces database latency significantly";
        let mut history = RoundHistory::default();
        history.push(RoundRecord {
            round: 1,
            exchanges: vec![exchange(text)],
            metrics: RoundMetrics::default(),
            insight_tags: BTreeSet::new(),
        });
        let current = vec![exchange(text)];
        let round_plan = plan(&[]);
        let assessment = RoundPolicy::default().assess(
            &RoundInput {
                plan: &round_plan,
                exchanges: &current,
                history: &history,
                previous_progress: ProgressSnapshot::default(),
                current_progress: ProgressSnapshot::default(),
            },
            &analyzer,
        );
        assert!(assessment.evaluation.redundancy);
        assert!(!assessment.evaluation.new_insights);
        assert!(!assessment.evaluation.objectives_complete);
        assert_eq!(
            RoundPolicy::default().decide(&assessment.evaluation, 2),
            TransitionReason::Redundancy
        );
    }

    #[test]
    fn test_progress_needs_two_flags() {
        let analyzer = NaiveTextAnalyzer::new();
        let round_plan = plan(&["anything"]);
        let history = RoundHistory::default();
        let exchanges = vec![exchange("Some content")];
        let previous = ProgressSnapshot::default();
        let assess = |current: ProgressSnapshot| {
            RoundPolicy::default()
                .assess(
                    &RoundInput {
                        plan: &round_plan,
                        exchanges: &exchanges,
                        history: &history,
                        previous_progress: previous,
                        current_progress: current,
                    },
                    &analyzer,
                )
                .evaluation
                .progress_made
        };
        let one = ProgressSnapshot {
            decisions: 1,
            ..Default::default()
        };
        let two = ProgressSnapshot {
            decisions: 1,
            topics: 3,
            ..Default::default()
        };
        assert!(!assess(one));
        assert!(assess(two));
    }

    #[test]
    fn test_decision_priority() {
        let policy = RoundPolicy::default();
        let mut eval = TransitionEvaluation {
            objectives_complete: true,
            sufficient_depth: true,
            progress_made: true,
            ..Default::default()
        };
        assert_eq!(policy.decide(&eval, 2), TransitionReason::ObjectivesAchieved);

        eval.objectives_complete = false;
        eval.consensus_reached = true;
        assert_eq!(policy.decide(&eval, 5), TransitionReason::ContinueExploration);
        assert_eq!(policy.decide(&eval, 6), TransitionReason::ConsensusAchieved);

        eval.progress_made = false;
        assert_eq!(policy.decide(&eval, 3), TransitionReason::ContinueExploration);
        assert_eq!(policy.decide(&eval, 4), TransitionReason::InsufficientProgress);

        let idle = TransitionEvaluation {
            progress_made: true,
            ..Default::default()
        };
        assert_eq!(policy.decide(&idle, 10), TransitionReason::MaxRoundsReached);
        assert!(TransitionReason::MaxRoundsReached.is_terminal());
        assert!(!TransitionReason::ConsensusAchieved.is_terminal());
    }
}
