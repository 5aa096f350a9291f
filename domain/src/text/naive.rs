//! Keyword-based default [`TextAnalyzer`].

use super::{SentenceKind, Stance, TextAnalyzer};
use crate::core::string::split_sentences;
use std::collections::BTreeSet;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "his", "how", "its", "may", "new", "now", "own", "say",
    "she", "too", "use", "who", "why", "will", "with", "this", "that", "these", "those", "from",
    "they", "them", "then", "than", "there", "their", "what", "when", "where", "which", "while",
    "would", "could", "should", "about", "into", "also", "just", "very", "more", "most", "some",
    "such", "only", "other", "been", "being", "were", "does", "each", "over", "under", "your",
    "ours", "here", "able", "both", "because", "through", "well",
];

const INSIGHT_MARKERS: &[&str] = &[
    "insight",
    "realize",
    "discover",
    "learned",
    "notice",
    "key finding",
    "important",
    "reveals",
    "suggests that",
];

const RISK_MARKERS: &[&str] = &[
    "risk",
    "concern",
    "issue",
    "problem",
    "vulnerab",
    "failure",
    "bottleneck",
    "danger",
    "threat",
    "downside",
];

const OPPORTUNITY_MARKERS: &[&str] = &[
    "opportunit",
    "benefit",
    "advantage",
    "improve",
    "potential",
    "leverage",
    "upside",
    "enable",
];

const DECISION_MARKERS: &[&str] = &[
    "we decided",
    "decided to",
    "decision",
    "we will",
    "agreed to",
    "let's go with",
    "conclude that",
    "settled on",
];

const COMPLETED_MARKERS: &[&str] = &[
    "completed",
    "finished",
    "implemented",
    "is done",
    "delivered",
    "resolved",
];

const ACCOMPLISHMENT_MARKERS: &[&str] = &[
    "accomplished",
    "achieved",
    "established",
    "identified",
    "completed",
    "defined",
    "produced",
    "agreed",
];

const RECOMMENDATION_MARKERS: &[&str] = &[
    "recommend",
    "should",
    "suggest",
    "propose",
    "next step",
    "advise",
];

const AGREEMENT_MARKERS: &[&str] = &[
    "i agree",
    "agreed",
    "we agree",
    "consensus",
    "aligns with",
    "concur",
    "good point",
    "exactly right",
    "in agreement",
];

const DISAGREEMENT_MARKERS: &[&str] = &[
    "disagree",
    "however",
    "on the contrary",
    "not convinced",
    "i differ",
    "alternative view",
    "push back",
    "counterpoint",
];

const FOLLOW_UP_MARKERS: &[&str] = &[
    "building on",
    "build on",
    "following up",
    "as mentioned",
    "to add to",
    "in response to",
    "expanding on",
    "as noted",
    "earlier point",
];

const MAX_CONCEPTS: usize = 5;
const MIN_CONCEPT_LEN: usize = 5;

/// Default analyzer: lowercase word sets and marker-phrase matching
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveTextAnalyzer;

impl NaiveTextAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= 3)
            .map(|w| w.to_lowercase())
            .filter(|w| !STOPWORDS.contains(&w.as_str()))
    }

    fn sentences_with(text: &str, markers: &[&str]) -> Vec<String> {
        split_sentences(text)
            .into_iter()
            .filter(|s| contains_any(&s.to_lowercase(), markers))
            .collect()
    }
}

fn contains_any(haystack: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| haystack.contains(m))
}

fn count_markers(haystack: &str, markers: &[&str]) -> usize {
    markers.iter().map(|m| haystack.matches(m).count()).sum()
}

impl TextAnalyzer for NaiveTextAnalyzer {
    fn words(&self, text: &str) -> BTreeSet<String> {
        Self::tokens(text).collect()
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        let left = self.words(a);
        let right = self.words(b);
        let union = left.union(&right).count();
        if union == 0 {
            return 0.0;
        }
        left.intersection(&right).count() as f64 / union as f64
    }

    fn word_overlap(&self, query: &str, content: &str) -> f64 {
        let query_words = self.words(query);
        if query_words.is_empty() {
            return 0.0;
        }
        let content_words = self.words(content);
        query_words
            .iter()
            .filter(|w| content_words.contains(*w))
            .count() as f64
            / query_words.len() as f64
    }

    fn concepts(&self, text: &str) -> Vec<String> {
        // (word, count), in order of first appearance
        let mut counts: Vec<(String, usize)> = Vec::new();
        for word in Self::tokens(text).filter(|w| w.len() >= MIN_CONCEPT_LEN) {
            match counts.iter_mut().find(|(w, _)| *w == word) {
                Some((_, n)) => *n += 1,
                None => counts.push((word, 1)),
            }
        }
        // Stable sort keeps first-appearance order among ties
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .take(MAX_CONCEPTS)
            .map(|(w, _)| w)
            .collect()
    }

    fn insight_tags(&self, text: &str) -> BTreeSet<String> {
        Self::sentences_with(text, INSIGHT_MARKERS)
            .iter()
            .flat_map(|s| self.concepts(s))
            .collect()
    }

    fn sentences(&self, text: &str, kind: SentenceKind) -> Vec<String> {
        let markers = match kind {
            SentenceKind::Question => {
                return split_sentences(text)
                    .into_iter()
                    .filter(|s| s.ends_with('?'))
                    .collect();
            }
            SentenceKind::Insight => INSIGHT_MARKERS,
            SentenceKind::Risk => RISK_MARKERS,
            SentenceKind::Opportunity => OPPORTUNITY_MARKERS,
            SentenceKind::Decision => DECISION_MARKERS,
            SentenceKind::CompletedTask => COMPLETED_MARKERS,
            SentenceKind::Accomplishment => ACCOMPLISHMENT_MARKERS,
            SentenceKind::Recommendation => RECOMMENDATION_MARKERS,
        };
        Self::sentences_with(text, markers)
    }

    fn stance(&self, text: &str) -> Stance {
        let lower = text.to_lowercase();
        let disagreements = count_markers(&lower, DISAGREEMENT_MARKERS);
        // "not in agreement" contains the "in agreement" marker
        let agreements = count_markers(&lower, AGREEMENT_MARKERS)
            .saturating_sub(lower.matches("not in agreement").count());
        Stance {
            agreements,
            disagreements,
        }
    }

    fn is_follow_up(&self, text: &str) -> bool {
        contains_any(&text.to_lowercase(), FOLLOW_UP_MARKERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_drop_stopwords_and_short_tokens() {
        let analyzer = NaiveTextAnalyzer::new();
        let words = analyzer.words("The API is fast, and the cache is warm.");
        assert!(words.contains("api"));
        assert!(words.contains("cache"));
        assert!(!words.contains("the"));
        assert!(!words.contains("is"));
    }

    #[test]
    fn test_similarity_bounds() {
        let analyzer = NaiveTextAnalyzer::new();
        assert_eq!(analyzer.similarity("", ""), 0.0);
        assert_eq!(
            analyzer.similarity("database caching layer", "database caching layer"),
            1.0
        );
        let partial = analyzer.similarity("database caching layer", "database sharding layer");
        assert!(partial > 0.0 && partial < 1.0);
    }

    #[test]
    fn test_word_overlap_is_query_relative() {
        let analyzer = NaiveTextAnalyzer::new();
        let overlap = analyzer.word_overlap("caching strategy", "a caching plan for the edge");
        assert_eq!(overlap, 0.5);
        assert_eq!(analyzer.word_overlap("", "anything"), 0.0);
    }

    #[test]
    fn test_concepts_rank_by_frequency() {
        let analyzer = NaiveTextAnalyzer::new();
        let concepts =
            analyzer.concepts("Latency matters. Reduce latency with caching. Caching and latency.");
        assert_eq!(concepts[0], "latency");
        assert_eq!(concepts[1], "caching");
        assert!(concepts.len() <= MAX_CONCEPTS);
    }

    #[test]
    fn test_insight_tags_only_from_insight_sentences() {
        let analyzer = NaiveTextAnalyzer::new();
        let tags = analyzer
            .insight_tags("We discovered that sharding reduces contention. Weather is sunny.");
        assert!(tags.contains("sharding"));
        assert!(!tags.contains("weather"));
    }

    #[test]
    fn test_risks_and_opportunities() {
        let analyzer = NaiveTextAnalyzer::new();
        let text = "The main risk is vendor lock-in. Caching offers a big advantage. Done.";
        assert_eq!(analyzer.risks(text), vec!["The main risk is vendor lock-in."]);
        assert_eq!(
            analyzer.opportunities(text),
            vec!["Caching offers a big advantage."]
        );
    }

    #[test]
    fn test_sentence_kinds() {
        let analyzer = NaiveTextAnalyzer::new();
        let text = "We decided to use Postgres. Who owns the migration? \
                    The schema work is completed. I recommend adding an index.";
        assert_eq!(
            analyzer.sentences(text, SentenceKind::Decision),
            vec!["We decided to use Postgres."]
        );
        assert_eq!(
            analyzer.sentences(text, SentenceKind::Question),
            vec!["Who owns the migration?"]
        );
        assert_eq!(
            analyzer.sentences(text, SentenceKind::CompletedTask),
            vec!["The schema work is completed."]
        );
        assert_eq!(
            analyzer.sentences(text, SentenceKind::Recommendation),
            vec!["I recommend adding an index."]
        );
    }

    #[test]
    fn test_stance_counts() {
        let analyzer = NaiveTextAnalyzer::new();
        let stance = analyzer.stance("I agree with the plan. However, I disagree on timing.");
        assert_eq!(stance.agreements, 1);
        assert_eq!(stance.disagreements, 2);
    }

    #[test]
    fn test_follow_up_detection() {
        let analyzer = NaiveTextAnalyzer::new();
        assert!(analyzer.is_follow_up("Building on the architect's proposal, we should..."));
        assert!(!analyzer.is_follow_up("Here is a fresh idea."));
    }
}
