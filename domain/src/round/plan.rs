//! Round phases and plans.

use crate::core::json::{extract_json_object, string_list};
use serde::{Deserialize, Serialize};

/// Discussion phase, a pure function of the round number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundPhase {
    Exploration,
    Analysis,
    Synthesis,
    Convergence,
    Conclusion,
}

impl RoundPhase {
    /// 1-2 exploration, 3-5 analysis, 6-7 synthesis, 8-9 convergence,
    /// 10 and later conclusion
    pub fn for_round(round: u32) -> Self {
        match round {
            0..=2 => RoundPhase::Exploration,
            3..=5 => RoundPhase::Analysis,
            6..=7 => RoundPhase::Synthesis,
            8..=9 => RoundPhase::Convergence,
            _ => RoundPhase::Conclusion,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RoundPhase::Exploration => "exploration",
            RoundPhase::Analysis => "analysis",
            RoundPhase::Synthesis => "synthesis",
            RoundPhase::Convergence => "convergence",
            RoundPhase::Conclusion => "conclusion",
        }
    }
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Objectives and approach for a single round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundPlan {
    pub round_number: u32,
    pub phase: RoundPhase,
    pub focus: String,
    pub objectives: Vec<String>,
    pub approach: String,
    pub questions: Vec<String>,
    pub is_fallback: bool,
}

impl RoundPlan {
    /// Static plan for a round's phase
    pub fn fallback(round_number: u32) -> Self {
        let phase = RoundPhase::for_round(round_number);
        let (focus, objectives, approach, questions): (&str, &[&str], &str, &[&str]) = match phase {
            RoundPhase::Exploration => (
                "Explore the problem space",
                &[
                    "Identify the key requirements",
                    "Surface constraints and assumptions",
                    "List candidate approaches",
                ],
                "Each agent contributes an independent perspective",
                &["What does success look like?", "What constraints apply?"],
            ),
            RoundPhase::Analysis => (
                "Analyze the candidate approaches",
                &[
                    "Evaluate trade-offs of each approach",
                    "Identify risks and dependencies",
                    "Challenge weak assumptions",
                ],
                "Agents critique and build on each other's proposals",
                &["Which approach has the best trade-offs?", "What could fail?"],
            ),
            RoundPhase::Synthesis => (
                "Synthesize a combined solution",
                &[
                    "Merge the strongest ideas into one design",
                    "Resolve open disagreements",
                ],
                "Agents integrate prior findings into a single proposal",
                &["How do the pieces fit together?"],
            ),
            RoundPhase::Convergence => (
                "Converge on decisions",
                &[
                    "Confirm the final decisions",
                    "Define the implementation plan",
                ],
                "Agents agree on concrete decisions and next steps",
                &["Is anything still blocking agreement?"],
            ),
            RoundPhase::Conclusion => (
                "Conclude the discussion",
                &[
                    "Summarize decisions and recommendations",
                    "Record remaining open questions",
                ],
                "Agents state final positions and recommendations",
                &["What are the final recommendations?"],
            ),
        };

        Self {
            round_number,
            phase,
            focus: focus.to_string(),
            objectives: objectives.iter().map(|s| s.to_string()).collect(),
            approach: approach.to_string(),
            questions: questions.iter().map(|s| s.to_string()).collect(),
            is_fallback: true,
        }
    }

    /// Parse `{focus, objectives[], approach, questions[]}`; missing pieces
    /// are filled from the phase fallback, an unparseable response yields the
    /// fallback plan.
    pub fn parse(round_number: u32, response: &str) -> Self {
        let fallback = Self::fallback(round_number);
        let Some(value) = extract_json_object(response) else {
            return fallback;
        };

        let text = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let focus = text("focus");
        let approach = text("approach");
        let objectives = string_list(&value, "objectives");
        let questions = string_list(&value, "questions");

        if focus.is_none() && objectives.is_empty() {
            return fallback;
        }

        Self {
            round_number,
            phase: fallback.phase,
            focus: focus.unwrap_or(fallback.focus),
            objectives: if objectives.is_empty() {
                fallback.objectives
            } else {
                objectives
            },
            approach: approach.unwrap_or(fallback.approach),
            questions: if questions.is_empty() {
                fallback.questions
            } else {
                questions
            },
            is_fallback: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_boundaries() {
        let phases: Vec<RoundPhase> = (1..=11).map(RoundPhase::for_round).collect();
        use RoundPhase::*;
        assert_eq!(
            phases,
            vec![
                Exploration,
                Exploration,
                Analysis,
                Analysis,
                Analysis,
                Synthesis,
                Synthesis,
                Convergence,
                Convergence,
                Conclusion,
                Conclusion,
            ]
        );
        assert_eq!(RoundPhase::for_round(250), Conclusion);
    }

    #[test]
    fn test_parse_plan() {
        let response = r#"{"focus": "Caching strategy", "objectives": ["Pick eviction policy"],
            "approach": "Compare LRU and LFU", "questions": ["What hit rate do we need?"]}"#;
        let plan = RoundPlan::parse(3, response);
        assert!(!plan.is_fallback);
        assert_eq!(plan.phase, RoundPhase::Analysis);
        assert_eq!(plan.focus, "Caching strategy");
        assert_eq!(plan.objectives, vec!["Pick eviction policy"]);
    }

    #[test]
    fn test_partial_plan_fills_from_fallback() {
        let plan = RoundPlan::parse(1, r#"{"focus": "Scope"}"#);
        assert!(!plan.is_fallback);
        assert_eq!(plan.objectives, RoundPlan::fallback(1).objectives);
    }

    #[test]
    fn test_unparseable_plan_is_fallback() {
        let plan = RoundPlan::parse(8, "Let's keep talking.");
        assert!(plan.is_fallback);
        assert_eq!(plan.phase, RoundPhase::Convergence);
        assert!(!plan.objectives.is_empty());
    }
}
