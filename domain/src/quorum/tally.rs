//! Continuation tally and stop rule.

use super::vote::ConsensusVote;
use serde::{Deserialize, Serialize};

/// Thresholds of the stop rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopPolicy {
    /// Stop when the weighted continue ratio falls below this
    pub continue_threshold: f64,
    /// Stop when average completion reaches this percentage
    pub completion_threshold: f64,
    pub max_iterations: u32,
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self {
            continue_threshold: 0.6,
            completion_threshold: 85.0,
            max_iterations: 100,
        }
    }
}

/// Aggregated continuation votes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuationTally {
    pub votes: Vec<ConsensusVote>,
    /// Share of votes to continue. Reported only; the stop rule does not
    /// read it.
    pub simple_ratio: f64,
    /// Σ confidence of continue votes / Σ confidence, in [0, 1]
    pub weighted_ratio: f64,
    pub average_completion: f64,
}

impl ContinuationTally {
    /// Tally successful votes. With no votes, or zero total confidence, the
    /// ratios default to 1.0 and completion to 0.
    ///
    /// # Example
    ///
    /// ```
    /// use council_domain::quorum::{ConsensusVote, ContinuationTally};
    ///
    /// let tally = ContinuationTally::from_votes(vec![
    ///     ConsensusVote::new("a", true, 0.9, 40.0),
    ///     ConsensusVote::new("b", false, 0.8, 60.0),
    ///     ConsensusVote::new("c", true, 0.5, 50.0),
    /// ]);
    /// assert!((tally.weighted_ratio - 1.4 / 2.2).abs() < 1e-9);
    /// ```
    pub fn from_votes(votes: Vec<ConsensusVote>) -> Self {
        if votes.is_empty() {
            return Self {
                votes,
                simple_ratio: 1.0,
                weighted_ratio: 1.0,
                average_completion: 0.0,
            };
        }

        let count = votes.len() as f64;
        let continue_count = votes.iter().filter(|v| v.should_continue).count() as f64;
        let total_confidence: f64 = votes.iter().map(|v| v.confidence).sum();
        let continue_confidence: f64 = votes
            .iter()
            .filter(|v| v.should_continue)
            .map(|v| v.confidence)
            .sum();
        let weighted_ratio = if total_confidence > 0.0 {
            (continue_confidence / total_confidence).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let average_completion =
            votes.iter().map(|v| v.completion_percentage).sum::<f64>() / count;

        Self {
            votes,
            simple_ratio: continue_count / count,
            weighted_ratio,
            average_completion,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}

/// Why the loop stops after a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    LowContinueRatio,
    CompletionReached,
    IterationCeiling,
}

impl StopReason {
    pub fn as_str(&self) -> &str {
        match self {
            StopReason::LowContinueRatio => "low_continue_ratio",
            StopReason::CompletionReached => "completion_reached",
            StopReason::IterationCeiling => "iteration_ceiling",
        }
    }
}

impl StopPolicy {
    /// `weighted_ratio < threshold OR completion >= threshold OR
    /// iteration >= max_iterations - 2`. An empty tally never stops on
    /// evidence, only on the iteration ceiling.
    pub fn evaluate(&self, tally: &ContinuationTally, iteration: u32) -> Option<StopReason> {
        if iteration >= self.max_iterations.saturating_sub(2) {
            return Some(StopReason::IterationCeiling);
        }
        if tally.is_empty() {
            return None;
        }
        if tally.weighted_ratio < self.continue_threshold {
            Some(StopReason::LowContinueRatio)
        } else if tally.average_completion >= self.completion_threshold {
            Some(StopReason::CompletionReached)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(cont: bool, confidence: f64, completion: f64) -> ConsensusVote {
        ConsensusVote::new("m", cont, confidence, completion)
    }

    #[test]
    fn test_weighted_ratio_scenario_continues() {
        let tally = ContinuationTally::from_votes(vec![
            vote(true, 0.9, 50.0),
            vote(false, 0.8, 50.0),
            vote(true, 0.5, 50.0),
        ]);
        assert!((tally.weighted_ratio - 0.636).abs() < 1e-3);
        assert!((tally.simple_ratio - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(StopPolicy::default().evaluate(&tally, 5), None);
    }

    #[test]
    fn test_ratio_boundary_exactly_threshold_continues() {
        // 0.6 / 1.0
        let tally = ContinuationTally::from_votes(vec![vote(true, 0.6, 10.0), vote(false, 0.4, 10.0)]);
        assert!((tally.weighted_ratio - 0.6).abs() < 1e-12);
        let policy = StopPolicy {
            continue_threshold: tally.weighted_ratio,
            ..Default::default()
        };
        assert_eq!(policy.evaluate(&tally, 1), None);
    }

    #[test]
    fn test_completion_boundary_exactly_85_stops() {
        let tally = ContinuationTally::from_votes(vec![vote(true, 1.0, 80.0), vote(true, 1.0, 90.0)]);
        assert_eq!(tally.average_completion, 85.0);
        assert_eq!(
            StopPolicy::default().evaluate(&tally, 1),
            Some(StopReason::CompletionReached)
        );
    }

    #[test]
    fn test_low_ratio_stops() {
        let tally = ContinuationTally::from_votes(vec![vote(false, 0.9, 10.0), vote(true, 0.1, 10.0)]);
        assert_eq!(
            StopPolicy::default().evaluate(&tally, 1),
            Some(StopReason::LowContinueRatio)
        );
    }

    #[test]
    fn test_zero_confidence_defaults_to_continue() {
        let tally = ContinuationTally::from_votes(vec![vote(false, 0.0, 10.0)]);
        assert_eq!(tally.weighted_ratio, 1.0);
        assert_eq!(StopPolicy::default().evaluate(&tally, 1), None);
    }

    #[test]
    fn test_no_votes_continue_until_ceiling() {
        let tally = ContinuationTally::from_votes(Vec::new());
        let policy = StopPolicy::default();
        assert_eq!(policy.evaluate(&tally, 97), None);
        assert_eq!(policy.evaluate(&tally, 98), Some(StopReason::IterationCeiling));
    }

    #[test]
    fn test_ratio_always_in_unit_interval() {
        for (a, b) in [(0.0, 1.0), (1.0, 0.0), (0.3, 0.3), (1.0, 1.0)] {
            let tally = ContinuationTally::from_votes(vec![vote(true, a, 0.0), vote(false, b, 0.0)]);
            assert!((0.0..=1.0).contains(&tally.weighted_ratio));
        }
    }
}
