//! Exchanges and per-round records.

use crate::agent::{AgentId, AgentType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// One agent contribution within a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub round: u32,
    pub agent_id: AgentId,
    pub agent_type: AgentType,
    pub model: String,
    pub content: String,
    /// The oracle returned fallback text instead of a real response
    #[serde(default)]
    pub is_fallback: bool,
}

impl Exchange {
    pub fn new(
        round: u32,
        agent_id: AgentId,
        agent_type: AgentType,
        model: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            round,
            agent_id,
            agent_type,
            model: model.into(),
            content: content.into(),
            is_fallback: false,
        }
    }

    pub fn fallback(mut self, is_fallback: bool) -> Self {
        self.is_fallback = is_fallback;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundMetrics {
    pub depth: f64,
    /// Agreement ratio of the round, 0.0 without stance signals
    pub consensus: f64,
    pub insight_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub exchanges: Vec<Exchange>,
    pub metrics: RoundMetrics,
    pub insight_tags: BTreeSet<String>,
}

impl RoundRecord {
    /// All exchange content joined, used for redundancy comparison
    pub fn combined_text(&self) -> String {
        combined_text(&self.exchanges)
    }
}

pub(crate) fn combined_text(exchanges: &[Exchange]) -> String {
    exchanges
        .iter()
        .map(|e| e.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Bounded history of completed rounds, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundHistory {
    records: VecDeque<RoundRecord>,
    limit: usize,
}

impl Default for RoundHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl RoundHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, record: RoundRecord) {
        if self.records.len() >= self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoundRecord> {
        self.records.iter()
    }

    /// The most recent `n` records, newest first
    pub fn last(&self, n: usize) -> impl Iterator<Item = &RoundRecord> {
        self.records.iter().rev().take(n)
    }

    /// Union of insight tags seen in the retained history
    pub fn insight_tags(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .flat_map(|r| r.insight_tags.iter().cloned())
            .collect()
    }
}
