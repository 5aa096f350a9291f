//! Conversation memory: the running record of a discussion.
//!
//! Tracks exchanges plus the decisions, open questions, completed tasks and
//! topics extracted from them. [`ConversationMemory::snapshot`] feeds the
//! progress check of round transition evaluation.

use crate::round::Exchange;
use crate::text::{SentenceKind, TextAnalyzer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Overlap above which a later statement resolves an open question
const RESOLUTION_OVERLAP: f64 = 0.6;
/// Exchanges shorter than this are not substantive
const SUBSTANTIVE_LEN: usize = 80;

/// Lifecycle of one discussion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionStage {
    AnalyzingObjective,
    SelectingAgents,
    Planning,
    Acting,
    Evaluating,
    Concluding,
    Done,
}

impl DiscussionStage {
    pub fn as_str(&self) -> &str {
        match self {
            DiscussionStage::AnalyzingObjective => "analyzing_objective",
            DiscussionStage::SelectingAgents => "selecting_agents",
            DiscussionStage::Planning => "planning",
            DiscussionStage::Acting => "acting",
            DiscussionStage::Evaluating => "evaluating",
            DiscussionStage::Concluding => "concluding",
            DiscussionStage::Done => "done",
        }
    }

    /// Stages reachable from this one
    pub fn can_advance_to(&self, next: DiscussionStage) -> bool {
        use DiscussionStage::*;
        matches!(
            (self, next),
            (AnalyzingObjective, SelectingAgents)
                | (SelectingAgents, Planning)
                | (Planning, Acting)
                | (Acting, Evaluating)
                | (Evaluating, Planning)
                | (Evaluating, Concluding)
                | (SelectingAgents, Concluding)
                | (Planning, Concluding)
                | (Acting, Concluding)
                | (Concluding, Done)
        )
    }
}

impl std::fmt::Display for DiscussionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counts compared between rounds to judge progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub decisions: usize,
    pub open_questions: usize,
    pub completed_tasks: usize,
    pub topics: usize,
}

impl ProgressSnapshot {
    /// Progress flags against an earlier snapshot:
    /// new decisions, fewer open questions, more completed tasks, more topics
    pub fn progress_flags(&self, previous: &ProgressSnapshot) -> [bool; 4] {
        [
            self.decisions > previous.decisions,
            self.open_questions < previous.open_questions,
            self.completed_tasks > previous.completed_tasks,
            self.topics > previous.topics,
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationMemory {
    exchanges: Vec<Exchange>,
    decisions: Vec<String>,
    open_questions: Vec<String>,
    completed_tasks: Vec<String>,
    topics: BTreeSet<String>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an exchange and fold its content into the tracked lists.
    ///
    /// Fallback exchanges are kept for the record but never contribute
    /// decisions, questions or topics.
    pub fn record(&mut self, exchange: Exchange, analyzer: &dyn TextAnalyzer) {
        if !exchange.is_fallback {
            let content = exchange.content.as_str();

            self.open_questions.retain(|question| {
                analyzer.word_overlap(question, content) < RESOLUTION_OVERLAP
            });

            for decision in analyzer.sentences(content, SentenceKind::Decision) {
                push_unique(&mut self.decisions, decision);
            }
            for task in analyzer.sentences(content, SentenceKind::CompletedTask) {
                push_unique(&mut self.completed_tasks, task);
            }
            for question in analyzer.sentences(content, SentenceKind::Question) {
                push_unique(&mut self.open_questions, question);
            }
            self.topics.extend(analyzer.concepts(content));
        }
        self.exchanges.push(exchange);
    }

    pub fn add_decision(&mut self, decision: impl Into<String>) {
        push_unique(&mut self.decisions, decision.into());
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Last `limit` exchanges that are not fallbacks and carry real content
    pub fn recent_substantive(&self, limit: usize) -> Vec<&Exchange> {
        let mut recent: Vec<&Exchange> = self
            .exchanges
            .iter()
            .rev()
            .filter(|e| !e.is_fallback && e.content.trim().len() >= SUBSTANTIVE_LEN)
            .take(limit)
            .collect();
        recent.reverse();
        recent
    }

    pub fn decisions(&self) -> &[String] {
        &self.decisions
    }

    pub fn open_questions(&self) -> &[String] {
        &self.open_questions
    }

    pub fn completed_tasks(&self) -> &[String] {
        &self.completed_tasks
    }

    pub fn topics(&self) -> &BTreeSet<String> {
        &self.topics
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            decisions: self.decisions.len(),
            open_questions: self.open_questions.len(),
            completed_tasks: self.completed_tasks.len(),
            topics: self.topics.len(),
        }
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.iter().any(|existing| existing.eq_ignore_ascii_case(&item)) {
        list.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentId, AgentType};
    use crate::text::NaiveTextAnalyzer;

    fn exchange(content: &str) -> Exchange {
        Exchange::new(
            1,
            AgentId::new("analyst-1"),
            AgentType::Analyst,
            "model-a",
            content,
        )
    }

    #[test]
    fn test_record_extracts_lists() {
        let analyzer = NaiveTextAnalyzer::new();
        let mut memory = ConversationMemory::new();
        memory.record(
            exchange("We decided to shard the orders table. Which shard key should we use?"),
            &analyzer,
        );
        assert_eq!(memory.decisions().len(), 1);
        assert_eq!(memory.open_questions(), &["Which shard key should we use?"]);
        assert!(memory.topics().contains("orders"));
    }

    #[test]
    fn test_questions_resolve_on_overlap() {
        let analyzer = NaiveTextAnalyzer::new();
        let mut memory = ConversationMemory::new();
        memory.record(exchange("Which shard key should we use?"), &analyzer);
        memory.record(
            exchange("The shard key we use will be customer id, which spreads load."),
            &analyzer,
        );
        assert!(memory.open_questions().is_empty());
    }

    #[test]
    fn test_fallback_exchanges_do_not_count() {
        let analyzer = NaiveTextAnalyzer::new();
        let mut memory = ConversationMemory::new();
        let mut fallback = exchange("We decided nothing because the provider failed?");
        fallback.is_fallback = true;
        memory.record(fallback, &analyzer);
        assert_eq!(memory.snapshot(), ProgressSnapshot::default());
        assert_eq!(memory.exchanges().len(), 1);
    }

    #[test]
    fn test_stage_transitions() {
        use DiscussionStage::*;
        assert!(AnalyzingObjective.can_advance_to(SelectingAgents));
        assert!(Evaluating.can_advance_to(Planning));
        assert!(Acting.can_advance_to(Concluding));
        assert!(!Done.can_advance_to(Planning));
        assert!(!Planning.can_advance_to(Evaluating));
    }

    #[test]
    fn test_progress_flags() {
        let before = ProgressSnapshot {
            decisions: 1,
            open_questions: 3,
            completed_tasks: 0,
            topics: 4,
        };
        let after = ProgressSnapshot {
            decisions: 2,
            open_questions: 2,
            completed_tasks: 0,
            topics: 4,
        };
        assert_eq!(after.progress_flags(&before), [true, true, false, false]);
    }

    #[test]
    fn test_recent_substantive_skips_short_and_fallback() {
        let analyzer = NaiveTextAnalyzer::new();
        let mut memory = ConversationMemory::new();
        let long = "A".repeat(100);
        memory.record(exchange(&long), &analyzer);
        memory.record(exchange("ok"), &analyzer);
        let recent = memory.recent_substantive(5);
        assert_eq!(recent.len(), 1);
    }
}
