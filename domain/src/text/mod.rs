//! Text analysis seam.
//!
//! Every keyword/regex style heuristic the orchestration core relies on
//! (similarity, concept extraction, risk detection, stance counting) goes
//! through [`TextAnalyzer`]. [`NaiveTextAnalyzer`] is the default; callers
//! hold an `Arc<dyn TextAnalyzer>` so a smarter implementation can be
//! swapped in without touching the algorithms that consume it.

mod naive;

pub use naive::NaiveTextAnalyzer;

use std::collections::BTreeSet;

/// Agreement / disagreement signal counts found in a piece of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stance {
    pub agreements: usize,
    pub disagreements: usize,
}

impl Stance {
    pub fn merge(self, other: Stance) -> Stance {
        Stance {
            agreements: self.agreements + other.agreements,
            disagreements: self.disagreements + other.disagreements,
        }
    }

    /// agreement / (agreement + disagreement), or `None` with no signals
    pub fn agreement_ratio(&self) -> Option<f64> {
        let total = self.agreements + self.disagreements;
        (total > 0).then(|| self.agreements as f64 / total as f64)
    }
}

/// Sentence categories the analyzer can pick out of free text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentenceKind {
    Insight,
    Risk,
    Opportunity,
    Decision,
    Question,
    CompletedTask,
    Accomplishment,
    Recommendation,
}

/// Narrow interface over text heuristics
pub trait TextAnalyzer: Send + Sync {
    /// Significant lowercase words (stopwords and short tokens removed)
    fn words(&self, text: &str) -> BTreeSet<String>;

    /// Jaccard similarity of the significant word sets, in [0, 1]
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Fraction of the query's significant words present in `content`, in [0, 1]
    fn word_overlap(&self, query: &str, content: &str) -> f64;

    /// Ranked key concepts of a text
    fn concepts(&self, text: &str) -> Vec<String>;

    /// Concept tags of sentences that announce an insight
    fn insight_tags(&self, text: &str) -> BTreeSet<String>;

    /// Sentences of the given kind, in order of appearance
    fn sentences(&self, text: &str, kind: SentenceKind) -> Vec<String>;

    /// Sentences describing risks or concerns
    fn risks(&self, text: &str) -> Vec<String> {
        self.sentences(text, SentenceKind::Risk)
    }

    /// Sentences describing opportunities or benefits
    fn opportunities(&self, text: &str) -> Vec<String> {
        self.sentences(text, SentenceKind::Opportunity)
    }

    /// Agreement / disagreement signals
    fn stance(&self, text: &str) -> Stance;

    /// Whether the text explicitly builds on an earlier contribution
    fn is_follow_up(&self, text: &str) -> bool;
}
