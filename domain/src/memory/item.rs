//! Memory items, importance scoring and the retention curve.

use crate::core::time::days_between;
use serde::{Deserialize, Serialize};

const IMPORTANT_KEYWORDS: &[&str] = &["important", "critical", "key", "essential", "crucial", "must"];
const WEIGHTED_CATEGORIES: &[&str] = &["decision", "error", "success"];
const RECENCY_HALF_LIFE_DAYS: f64 = 7.0;

/// The six memory kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryKind {
    ShortTerm,
    LongTerm,
    Episodic,
    Semantic,
    Working,
    Procedural,
}

impl MemoryKind {
    pub const ALL: [MemoryKind; 6] = [
        MemoryKind::ShortTerm,
        MemoryKind::LongTerm,
        MemoryKind::Episodic,
        MemoryKind::Semantic,
        MemoryKind::Working,
        MemoryKind::Procedural,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            MemoryKind::ShortTerm => "short-term",
            MemoryKind::LongTerm => "long-term",
            MemoryKind::Episodic => "episodic",
            MemoryKind::Semantic => "semantic",
            MemoryKind::Working => "working",
            MemoryKind::Procedural => "procedural",
        }
    }
}

impl std::fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    pub timestamp: u64,
    pub last_accessed: u64,
    pub access_count: u32,
    /// In [0, 1]
    pub importance: f64,
    /// Freshness in [0, 1]; below 0.1 a long-term item is forgotten
    pub decay: f64,
    pub associations: Vec<String>,
    pub confidence: f64,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: String,
    pub kind: MemoryKind,
    pub content: String,
    pub metadata: MemoryMetadata,
}

impl MemoryItem {
    /// Age in days at `now`
    pub fn age_days(&self, now: u64) -> f64 {
        days_between(self.metadata.timestamp, now)
    }

    /// `0.5^(age / 7 days)`
    pub fn recency(&self, now: u64) -> f64 {
        0.5_f64.powf(self.age_days(now) / RECENCY_HALF_LIFE_DAYS)
    }

    /// Record an access; from the fifth access on importance grows by 10%
    pub fn reinforce(&mut self, now: u64) {
        self.metadata.access_count += 1;
        self.metadata.last_accessed = now;
        if self.metadata.access_count >= 5 {
            self.metadata.importance = (self.metadata.importance * 1.1).min(1.0);
        }
    }

    pub fn associate(&mut self, other_id: &str) {
        if other_id != self.id && !self.metadata.associations.iter().any(|a| a == other_id) {
            self.metadata.associations.push(other_id.to_string());
        }
    }
}

/// Caller-supplied metadata for a new memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRequest {
    pub source: String,
    pub category: String,
    pub confidence: f64,
    pub associations: Vec<String>,
}

impl Default for StoreRequest {
    fn default() -> Self {
        Self {
            source: "agent".to_string(),
            category: String::new(),
            confidence: 1.0,
            associations: Vec::new(),
        }
    }
}

impl StoreRequest {
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

/// Importance of new content in [0, 1].
///
/// base 0.5, +0.2 user-sourced, +0.15 decision / error / success category,
/// +0.1 when the content carries an "important"-class keyword.
pub fn compute_importance(content: &str, request: &StoreRequest) -> f64 {
    let mut importance: f64 = 0.5;
    if request.source.eq_ignore_ascii_case("user") {
        importance += 0.2;
    }
    if WEIGHTED_CATEGORIES
        .iter()
        .any(|c| request.category.eq_ignore_ascii_case(c))
    {
        importance += 0.15;
    }
    let lower = content.to_lowercase();
    if IMPORTANT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        importance += 0.1;
    }
    importance.min(1.0)
}

/// Forgetting-curve retention in [0, 1].
///
/// Stability `S = 1 + 9·importance + 0.5·min(access_count, 20)` days;
/// retention `0.6·e^(−age/S) + 0.4·e^(−since_access/S)`.
pub fn retention(importance: f64, access_count: u32, age_days: f64, since_access_days: f64) -> f64 {
    let importance = if importance.is_finite() {
        importance.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let stability = 1.0 + 9.0 * importance + 0.5 * access_count.min(20) as f64;
    let age = age_days.max(0.0);
    let since_access = since_access_days.max(0.0);
    let value = 0.6 * (-age / stability).exp() + 0.4 * (-since_access / stability).exp();
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Retention of an item at `now`
pub fn item_retention(item: &MemoryItem, now: u64) -> f64 {
    retention(
        item.metadata.importance,
        item.metadata.access_count,
        item.age_days(now),
        days_between(item.metadata.last_accessed, now),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::DAY_MS;

    #[test]
    fn test_importance_components() {
        let base = StoreRequest::default();
        assert_eq!(compute_importance("note", &base), 0.5);
        let user = StoreRequest::from_source("user").with_category("decision");
        assert!((compute_importance("This is critical", &user) - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_importance_is_capped() {
        let request = StoreRequest::from_source("USER").with_category("error");
        assert!(compute_importance("key essential must", &request) <= 1.0);
    }

    #[test]
    fn test_retention_bounds() {
        for importance in [0.0, 0.3, 1.0] {
            for access in [0, 3, 50] {
                for age in [0.0, 0.5, 10.0, 1_000.0] {
                    let r = retention(importance, access, age, age / 2.0);
                    assert!((0.0..=1.0).contains(&r), "{importance} {access} {age}");
                }
            }
        }
        assert_eq!(retention(0.5, 0, 0.0, 0.0), 1.0);
    }

    #[test]
    fn test_retention_decreases_with_age_and_grows_with_importance() {
        assert!(retention(0.2, 0, 5.0, 5.0) < retention(0.2, 0, 1.0, 1.0));
        assert!(retention(0.9, 0, 5.0, 5.0) > retention(0.2, 0, 5.0, 5.0));
        assert!(retention(0.0, 0, 10.0, 10.0) < 0.1);
    }

    #[test]
    fn test_reinforce_after_five_accesses() {
        let mut item = MemoryItem {
            id: "a-long-term-1".to_string(),
            kind: MemoryKind::LongTerm,
            content: "x".to_string(),
            metadata: MemoryMetadata {
                timestamp: 0,
                last_accessed: 0,
                access_count: 3,
                importance: 0.5,
                decay: 1.0,
                associations: Vec::new(),
                confidence: 1.0,
                source: String::new(),
                category: String::new(),
            },
        };
        item.reinforce(DAY_MS);
        assert_eq!(item.metadata.importance, 0.5);
        item.reinforce(DAY_MS);
        assert!((item.metadata.importance - 0.55).abs() < 1e-9);
        assert_eq!(item.metadata.last_accessed, DAY_MS);
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&MemoryKind::ShortTerm).unwrap(),
            "\"short-term\""
        );
    }
}
