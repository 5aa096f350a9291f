//! Final synthesis of a discussion.
//!
//! Narratives from several models are merged by pulling out accomplishment,
//! insight and recommendation sentences. When no model answers, a structured
//! summary is assembled straight from [`ConversationMemory`].

use crate::conversation::ConversationMemory;
use crate::core::string::truncate;
use crate::text::{SentenceKind, TextAnalyzer};
use serde::{Deserialize, Serialize};

/// Sentences per section kept in a merged conclusion
const SECTION_LIMIT: usize = 8;
/// Sentences at or above this similarity to a kept one are duplicates
const DUPLICATE_SIMILARITY: f64 = 0.8;
const EXCERPT_LEN: usize = 240;
const NARRATIVE_EXCERPT_LEN: usize = 1_000;

/// One model's narrative synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub model: String,
    pub content: String,
}

impl Narrative {
    pub fn new(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conclusion {
    pub objective: String,
    pub accomplishments: Vec<String>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub open_questions: Vec<String>,
    /// Models whose narratives were merged
    pub sources: Vec<String>,
    /// Built from conversation memory because no model responded
    pub is_fallback: bool,
}

impl Conclusion {
    pub fn is_empty(&self) -> bool {
        self.accomplishments.is_empty()
            && self.insights.is_empty()
            && self.recommendations.is_empty()
    }

    /// Markdown rendering
    pub fn render(&self) -> String {
        let mut out = format!("# Conclusion: {}\n", self.objective);
        let sections = [
            ("Accomplishments", &self.accomplishments),
            ("Key insights", &self.insights),
            ("Recommendations", &self.recommendations),
            ("Open questions", &self.open_questions),
        ];
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("\n## {title}\n"));
            for item in items {
                out.push_str(&format!("- {item}\n"));
            }
        }
        if !self.sources.is_empty() {
            out.push_str(&format!("\n_Synthesized from: {}_\n", self.sources.join(", ")));
        }
        out
    }
}

/// Merge model narratives into one conclusion.
///
/// Empty narratives are ignored. If none of the remaining text yields a
/// classified sentence, the first narrative is kept as a single insight so a
/// responding model is never discarded.
pub fn merge_narratives(
    objective: &str,
    narratives: &[Narrative],
    memory: &ConversationMemory,
    analyzer: &dyn TextAnalyzer,
) -> Conclusion {
    let usable: Vec<&Narrative> = narratives
        .iter()
        .filter(|n| !n.content.trim().is_empty())
        .collect();
    if usable.is_empty() {
        return structured_summary(objective, memory);
    }

    let mut conclusion = Conclusion {
        objective: objective.to_string(),
        open_questions: memory.open_questions().to_vec(),
        sources: usable.iter().map(|n| n.model.clone()).collect(),
        ..Default::default()
    };

    for narrative in &usable {
        let text = narrative.content.as_str();
        for sentence in analyzer.sentences(text, SentenceKind::Accomplishment) {
            push_distinct(&mut conclusion.accomplishments, sentence, analyzer);
        }
        for sentence in analyzer.sentences(text, SentenceKind::Insight) {
            push_distinct(&mut conclusion.insights, sentence, analyzer);
        }
        for sentence in analyzer.sentences(text, SentenceKind::Recommendation) {
            push_distinct(&mut conclusion.recommendations, sentence, analyzer);
        }
    }

    if conclusion.is_empty() {
        conclusion
            .insights
            .push(truncate(usable[0].content.trim(), NARRATIVE_EXCERPT_LEN));
    }
    conclusion
}

/// Conclusion assembled from memory alone
pub fn structured_summary(objective: &str, memory: &ConversationMemory) -> Conclusion {
    let mut accomplishments: Vec<String> = memory.completed_tasks().to_vec();
    accomplishments.extend(memory.decisions().iter().map(|d| format!("Decision: {d}")));
    accomplishments.truncate(SECTION_LIMIT);

    let insights = memory
        .recent_substantive(3)
        .into_iter()
        .map(|e| format!("{}: {}", e.agent_id, truncate(e.content.trim(), EXCERPT_LEN)))
        .collect();

    let mut recommendations: Vec<String> = memory
        .open_questions()
        .iter()
        .take(3)
        .map(|q| format!("Resolve: {q}"))
        .collect();
    if !memory.topics().is_empty() {
        let topics: Vec<&str> = memory.topics().iter().take(5).map(String::as_str).collect();
        recommendations.push(format!("Continue work on: {}", topics.join(", ")));
    }

    Conclusion {
        objective: objective.to_string(),
        accomplishments,
        insights,
        recommendations,
        open_questions: memory.open_questions().to_vec(),
        sources: Vec::new(),
        is_fallback: true,
    }
}

fn push_distinct(list: &mut Vec<String>, sentence: String, analyzer: &dyn TextAnalyzer) {
    if list.len() >= SECTION_LIMIT {
        return;
    }
    let duplicate = list.iter().any(|kept| {
        kept.eq_ignore_ascii_case(&sentence)
            || analyzer.similarity(kept, &sentence) >= DUPLICATE_SIMILARITY
    });
    if !duplicate {
        list.push(sentence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentId, AgentType};
    use crate::round::Exchange;
    use crate::text::NaiveTextAnalyzer;

    #[test]
    fn test_merge_dedupes_across_models() {
        let analyzer = NaiveTextAnalyzer::new();
        let memory = ConversationMemory::new();
        let narratives = vec![
            Narrative::new(
                "a",
                "We identified the hot partition. We recommend a customer-keyed shard.",
            ),
            Narrative::new(
                "b",
                "We identified the hot partition! Key finding: writes dominate reads.",
            ),
            Narrative::new("c", "   "),
        ];
        let conclusion = merge_narratives("Scale orders", &narratives, &memory, &analyzer);
        assert!(!conclusion.is_fallback);
        assert_eq!(conclusion.sources, vec!["a", "b"]);
        assert_eq!(conclusion.accomplishments.len(), 1);
        assert_eq!(conclusion.recommendations.len(), 1);
        assert_eq!(conclusion.insights, vec!["Key finding: writes dominate reads."]);
    }

    #[test]
    fn test_unclassified_narrative_is_kept() {
        let analyzer = NaiveTextAnalyzer::new();
        let memory = ConversationMemory::new();
        let narratives = vec![Narrative::new("a", "Orders grow ten percent monthly.")];
        let conclusion = merge_narratives("Scale orders", &narratives, &memory, &analyzer);
        assert_eq!(conclusion.insights, vec!["Orders grow ten percent monthly."]);
    }

    #[test]
    fn test_fallback_summary_from_memory() {
        let analyzer = NaiveTextAnalyzer::new();
        let mut memory = ConversationMemory::new();
        memory.record(
            Exchange::new(
                2,
                AgentId::new("architect-1"),
                AgentType::Architect,
                "m",
                "We decided to shard by customer. Which region hosts the primary?",
            ),
            &analyzer,
        );
        let conclusion = merge_narratives("Scale orders", &[], &memory, &analyzer);
        assert!(conclusion.is_fallback);
        assert_eq!(
            conclusion.accomplishments,
            vec!["Decision: We decided to shard by customer."]
        );
        assert_eq!(
            conclusion.recommendations[0],
            "Resolve: Which region hosts the primary?"
        );
        assert!(conclusion.render().contains("## Open questions"));
    }
}
