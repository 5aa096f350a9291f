//! Continuation votes.

use crate::core::json::{bool_field, extract_json_object, number_field};
use serde::{Deserialize, Serialize};

/// Neutral values used when a vote is given only as a keyword
const KEYWORD_CONFIDENCE: f64 = 0.5;
const KEYWORD_COMPLETION: f64 = 50.0;

/// One model's opinion on whether the discussion should continue
///
/// # Example
///
/// ```
/// use council_domain::quorum::ConsensusVote;
///
/// let vote = ConsensusVote::new("gpt-5", true, 0.9, 40.0);
/// assert!(vote.should_continue);
///
/// let clamped = ConsensusVote::new("gpt-5", false, 1.7, 140.0);
/// assert_eq!(clamped.confidence, 1.0);
/// assert_eq!(clamped.completion_percentage, 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusVote {
    pub model_name: String,
    pub should_continue: bool,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Estimated completion in [0, 100]
    pub completion_percentage: f64,
    pub reasoning: String,
}

impl ConsensusVote {
    pub fn new(
        model_name: impl Into<String>,
        should_continue: bool,
        confidence: f64,
        completion_percentage: f64,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            should_continue,
            confidence: sanitize(confidence, 1.0),
            completion_percentage: sanitize(completion_percentage, 100.0),
            reasoning: String::new(),
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    /// Parse a vote from a response.
    ///
    /// JSON `{shouldContinue, confidence, completionPercentage, reasoning}`
    /// is preferred; a bare CONTINUE / STOP keyword is accepted with neutral
    /// confidence. Anything else is not a vote.
    pub fn parse(model_name: impl Into<String>, response: &str) -> Option<Self> {
        let model_name = model_name.into();

        if let Some(value) = extract_json_object(response) {
            let should_continue = ["shouldContinue", "should_continue", "continue"]
                .iter()
                .find_map(|key| bool_field(&value, key));
            if let Some(should_continue) = should_continue {
                let confidence = number_field(&value, "confidence").unwrap_or(KEYWORD_CONFIDENCE);
                // Confidence may arrive as a percentage
                let confidence = if confidence > 1.0 {
                    confidence / 100.0
                } else {
                    confidence
                };
                let completion = ["completionPercentage", "completion_percentage", "completion"]
                    .iter()
                    .find_map(|key| number_field(&value, key))
                    .unwrap_or(KEYWORD_COMPLETION);
                let reasoning = value
                    .get("reasoning")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                return Some(
                    Self::new(model_name, should_continue, confidence, completion)
                        .with_reasoning(reasoning),
                );
            }
        }

        let upper = response.to_uppercase();
        let says_continue = upper.contains("CONTINUE");
        let says_stop = upper.contains("STOP");
        match (says_continue, says_stop) {
            (true, false) => Some(
                Self::new(model_name, true, KEYWORD_CONFIDENCE, KEYWORD_COMPLETION)
                    .with_reasoning(response.trim()),
            ),
            (false, true) => Some(
                Self::new(model_name, false, KEYWORD_CONFIDENCE, KEYWORD_COMPLETION)
                    .with_reasoning(response.trim()),
            ),
            _ => None,
        }
    }
}

fn sanitize(value: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_vote() {
        let response = r#"```json
{"shouldContinue": false, "confidence": 0.8, "completionPercentage": 90, "reasoning": "Done"}
```"#;
        let vote = ConsensusVote::parse("model-a", response).unwrap();
        assert!(!vote.should_continue);
        assert_eq!(vote.confidence, 0.8);
        assert_eq!(vote.completion_percentage, 90.0);
        assert_eq!(vote.reasoning, "Done");
    }

    #[test]
    fn test_percentage_confidence_is_scaled() {
        let vote =
            ConsensusVote::parse("m", r#"{"shouldContinue": "yes", "confidence": "75%"}"#).unwrap();
        assert!(vote.should_continue);
        assert_eq!(vote.confidence, 0.75);
        assert_eq!(vote.completion_percentage, 50.0);
    }

    #[test]
    fn test_keyword_fallback() {
        let vote = ConsensusVote::parse("m", "I think we should CONTINUE.").unwrap();
        assert!(vote.should_continue);
        assert_eq!(vote.confidence, 0.5);
        assert!(!ConsensusVote::parse("m", "Stop here.").unwrap().should_continue);
    }

    #[test]
    fn test_ambiguous_response_is_not_a_vote() {
        assert!(ConsensusVote::parse("m", "Continue or stop, hard to say").is_none());
        assert!(ConsensusVote::parse("m", "No opinion.").is_none());
    }
}
