//! Per-agent layered memory bank.

use super::index::MemoryIndexes;
use super::item::{
    MemoryItem, MemoryKind, MemoryMetadata, StoreRequest, compute_importance, item_retention,
};
use crate::agent::AgentId;
use crate::core::time::SECOND_MS;
use crate::text::TextAnalyzer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

const SHORT_TERM_PROMOTION: f64 = 0.5;
const WORKING_SPILL: f64 = 0.3;
const CONSOLIDATION_IMPORTANCE: f64 = 0.7;
const CONSOLIDATION_ACCESSES: u32 = 3;
const MERGE_SIMILARITY: f64 = 0.8;
const ASSOCIATION_SIMILARITY: f64 = 0.5;
const ASSOCIATION_WINDOW: usize = 50;
const FORGET_BELOW: f64 = 0.1;
const PATTERN_MIN_COUNT: usize = 3;
const RECENT_FOR_CONCEPTS: usize = 10;
const GENERAL_KEY: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryCapacities {
    pub short_term: usize,
    pub working: usize,
    pub episodic: usize,
    pub long_term: usize,
    pub consolidation_interval_ms: u64,
}

impl Default for MemoryCapacities {
    fn default() -> Self {
        Self {
            short_term: 100,
            working: 20,
            episodic: 500,
            long_term: 1000,
            consolidation_interval_ms: 300 * SECOND_MS,
        }
    }
}

/// A procedure keyed by its action verb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    pub verb: String,
    pub steps: Vec<MemoryItem>,
    pub usage_count: u32,
}

/// What happened on a store call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreReceipt {
    pub id: String,
    /// Items promoted to long-term by short-term overflow during this call
    pub promoted: usize,
    pub consolidation_due: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveOptions {
    /// Kinds to search; empty searches all
    pub kinds: Vec<MemoryKind>,
    pub limit: usize,
    pub min_importance: f64,
    pub max_age_days: Option<f64>,
    pub min_decay: f64,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            kinds: Vec::new(),
            limit: 10,
            min_importance: 0.0,
            max_age_days: None,
            min_decay: 0.0,
        }
    }
}

impl RetrieveOptions {
    pub fn kinds(mut self, kinds: &[MemoryKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedMemory {
    pub item: MemoryItem,
    pub relevance: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationReport {
    pub patterns: usize,
    pub promoted: usize,
    pub merged: usize,
    pub concepts: usize,
    pub associations: usize,
    pub forgotten: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub counts: BTreeMap<MemoryKind, usize>,
    pub total: usize,
    /// Short-term overflow promotions
    pub promotions: usize,
    pub consolidations: usize,
    pub patterns: BTreeMap<String, usize>,
}

/// Serialisable content of a bank (the "memory" artifact)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub agent_id: AgentId,
    pub short_term: Vec<MemoryItem>,
    pub working: Vec<MemoryItem>,
    pub long_term: Vec<MemoryItem>,
    pub episodic: Vec<MemoryItem>,
    pub semantic: BTreeMap<String, Vec<MemoryItem>>,
    pub procedural: Vec<Procedure>,
    pub sequence: u64,
    #[serde(default)]
    pub patterns: BTreeMap<String, usize>,
    /// Concepts extracted during consolidation, mapped to source item ids
    #[serde(default)]
    pub concepts: BTreeMap<String, BTreeSet<String>>,
}

impl MemorySnapshot {
    pub fn items(&self) -> impl Iterator<Item = &MemoryItem> {
        self.short_term
            .iter()
            .chain(&self.working)
            .chain(&self.long_term)
            .chain(&self.episodic)
            .chain(self.semantic.values().flatten())
            .chain(self.procedural.iter().flat_map(|p| &p.steps))
    }

    pub fn item_count(&self) -> usize {
        self.items().count()
    }
}

pub struct AgentMemoryBank {
    agent_id: AgentId,
    capacities: MemoryCapacities,
    analyzer: Arc<dyn TextAnalyzer>,
    short_term: VecDeque<MemoryItem>,
    working: VecDeque<MemoryItem>,
    long_term: BTreeMap<String, MemoryItem>,
    episodic: Vec<MemoryItem>,
    semantic: BTreeMap<String, Vec<MemoryItem>>,
    procedural: BTreeMap<String, Procedure>,
    indexes: MemoryIndexes,
    patterns: BTreeMap<String, usize>,
    concepts: BTreeMap<String, BTreeSet<String>>,
    sequence: u64,
    last_consolidation: u64,
    promotions: usize,
    consolidations: usize,
}

impl AgentMemoryBank {
    pub fn new(
        agent_id: AgentId,
        capacities: MemoryCapacities,
        analyzer: Arc<dyn TextAnalyzer>,
        now: u64,
    ) -> Self {
        Self {
            agent_id,
            capacities,
            analyzer,
            short_term: VecDeque::new(),
            working: VecDeque::new(),
            long_term: BTreeMap::new(),
            episodic: Vec::new(),
            semantic: BTreeMap::new(),
            procedural: BTreeMap::new(),
            indexes: MemoryIndexes::default(),
            patterns: BTreeMap::new(),
            concepts: BTreeMap::new(),
            sequence: 0,
            last_consolidation: now,
            promotions: 0,
            consolidations: 0,
        }
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    pub fn indexes(&self) -> &MemoryIndexes {
        &self.indexes
    }

    pub fn len(&self, kind: MemoryKind) -> usize {
        match kind {
            MemoryKind::ShortTerm => self.short_term.len(),
            MemoryKind::LongTerm => self.long_term.len(),
            MemoryKind::Episodic => self.episodic.len(),
            MemoryKind::Semantic => self.semantic.values().map(Vec::len).sum(),
            MemoryKind::Working => self.working.len(),
            MemoryKind::Procedural => self.procedural.values().map(|p| p.steps.len()).sum(),
        }
    }

    /// Store new content and report whether consolidation is due.
    pub fn store(
        &mut self,
        kind: MemoryKind,
        content: impl Into<String>,
        request: StoreRequest,
        now: u64,
    ) -> StoreReceipt {
        let content = content.into();
        self.sequence += 1;
        let id = format!("{}-{}-{}", self.agent_id, kind.as_str(), self.sequence);
        let item = MemoryItem {
            id: id.clone(),
            kind,
            metadata: MemoryMetadata {
                timestamp: now,
                last_accessed: now,
                access_count: 0,
                importance: compute_importance(&content, &request),
                decay: 1.0,
                associations: request.associations.clone(),
                confidence: request.confidence.clamp(0.0, 1.0),
                source: request.source,
                category: request.category,
            },
            content,
        };
        self.indexes.insert(&item, self.analyzer.as_ref());

        let before = self.promotions;
        match kind {
            MemoryKind::ShortTerm => self.push_short_term(item),
            MemoryKind::Working => self.push_working(item),
            MemoryKind::LongTerm => self.insert_long_term(item),
            MemoryKind::Episodic => self.push_episodic(item, now),
            MemoryKind::Semantic => self.push_semantic(item),
            MemoryKind::Procedural => self.push_procedural(item),
        }

        StoreReceipt {
            id,
            promoted: self.promotions - before,
            consolidation_due: self.consolidation_due(now),
        }
    }

    pub fn consolidation_due(&self, now: u64) -> bool {
        let short_full = self.short_term.len() as f64 >= 0.8 * self.capacities.short_term as f64;
        let working_full = self.working.len() as f64 >= 0.9 * self.capacities.working as f64;
        let interval = now.saturating_sub(self.last_consolidation)
            >= self.capacities.consolidation_interval_ms;
        short_full || working_full || interval
    }

    fn push_short_term(&mut self, item: MemoryItem) {
        self.short_term.push_back(item);
        while self.short_term.len() > self.capacities.short_term {
            let Some(oldest) = self.short_term.pop_front() else {
                break;
            };
            if oldest.metadata.importance > SHORT_TERM_PROMOTION {
                self.promotions += 1;
                self.insert_long_term(MemoryItem {
                    kind: MemoryKind::LongTerm,
                    ..oldest
                });
            } else {
                self.indexes.remove(&oldest.id);
            }
        }
    }

    fn push_working(&mut self, item: MemoryItem) {
        self.working.push_back(item);
        while self.working.len() > self.capacities.working {
            let Some(oldest) = self.working.pop_front() else {
                break;
            };
            if oldest.metadata.importance > WORKING_SPILL {
                self.push_short_term(MemoryItem {
                    kind: MemoryKind::ShortTerm,
                    ..oldest
                });
            } else {
                self.indexes.remove(&oldest.id);
            }
        }
    }

    fn insert_long_term(&mut self, item: MemoryItem) {
        if !self.long_term.contains_key(&item.id) && self.long_term.len() >= self.capacities.long_term {
            // Evict the weakest memory
            let weakest = self
                .long_term
                .values()
                .min_by(|a, b| {
                    (a.metadata.importance * a.metadata.decay)
                        .total_cmp(&(b.metadata.importance * b.metadata.decay))
                })
                .map(|m| m.id.clone());
            if let Some(weakest) = weakest {
                self.long_term.remove(&weakest);
                self.indexes.remove(&weakest);
            }
        }
        self.long_term.insert(item.id.clone(), item);
    }

    fn push_episodic(&mut self, item: MemoryItem, now: u64) {
        self.episodic.push(item);
        self.episodic.sort_by(|a, b| {
            let score = |m: &MemoryItem| m.metadata.importance * m.recency(now);
            score(b).total_cmp(&score(a))
        });
        while self.episodic.len() > self.capacities.episodic {
            if let Some(dropped) = self.episodic.pop() {
                self.indexes.remove(&dropped.id);
            }
        }
    }

    fn push_semantic(&mut self, item: MemoryItem) {
        let concept = self
            .analyzer
            .concepts(&item.content)
            .into_iter()
            .next()
            .unwrap_or_else(|| GENERAL_KEY.to_string());
        self.semantic.entry(concept).or_default().push(item);
    }

    fn push_procedural(&mut self, item: MemoryItem) {
        let verb = action_verb(&item.content);
        let procedure = self
            .procedural
            .entry(verb.clone())
            .or_insert_with(|| Procedure {
                verb,
                steps: Vec::new(),
                usage_count: 0,
            });
        procedure.usage_count += 1;
        procedure.steps.push(item);
    }

    pub fn procedure(&self, verb: &str) -> Option<&Procedure> {
        self.procedural.get(verb)
    }

    fn items_of(&self, kind: MemoryKind) -> Box<dyn Iterator<Item = &MemoryItem> + '_> {
        match kind {
            MemoryKind::ShortTerm => Box::new(self.short_term.iter()),
            MemoryKind::Working => Box::new(self.working.iter()),
            MemoryKind::LongTerm => Box::new(self.long_term.values()),
            MemoryKind::Episodic => Box::new(self.episodic.iter()),
            MemoryKind::Semantic => Box::new(self.semantic.values().flatten()),
            MemoryKind::Procedural => Box::new(self.procedural.values().flat_map(|p| &p.steps)),
        }
    }

    fn item_mut(&mut self, kind: MemoryKind, id: &str) -> Option<&mut MemoryItem> {
        match kind {
            MemoryKind::ShortTerm => self.short_term.iter_mut().find(|m| m.id == id),
            MemoryKind::Working => self.working.iter_mut().find(|m| m.id == id),
            MemoryKind::LongTerm => self.long_term.get_mut(id),
            MemoryKind::Episodic => self.episodic.iter_mut().find(|m| m.id == id),
            MemoryKind::Semantic => self.semantic.values_mut().flatten().find(|m| m.id == id),
            MemoryKind::Procedural => self
                .procedural
                .values_mut()
                .flat_map(|p| p.steps.iter_mut())
                .find(|m| m.id == id),
        }
    }

    /// Search memories.
    ///
    /// relevance = 0.5·substring + 0.3·word overlap + 0.2·recency (7-day
    /// half-life); results are ranked by relevance × importance × decay and
    /// every returned item is reinforced. A non-empty query only matches
    /// items sharing a substring or a word with it.
    pub fn retrieve(&mut self, query: &str, options: &RetrieveOptions, now: u64) -> Vec<RetrievedMemory> {
        let kinds: Vec<MemoryKind> = if options.kinds.is_empty() {
            MemoryKind::ALL.to_vec()
        } else {
            options.kinds.clone()
        };
        let query_lower = query.trim().to_lowercase();

        let mut scored: Vec<(MemoryKind, String, f64, f64)> = Vec::new();
        for kind in &kinds {
            for item in self.items_of(*kind) {
                let meta = &item.metadata;
                if meta.importance < options.min_importance || meta.decay < options.min_decay {
                    continue;
                }
                if options
                    .max_age_days
                    .is_some_and(|max| item.age_days(now) > max)
                {
                    continue;
                }
                let substring = !query_lower.is_empty()
                    && item.content.to_lowercase().contains(&query_lower);
                let overlap = self.analyzer.word_overlap(query, &item.content);
                if !query_lower.is_empty() && !substring && overlap == 0.0 {
                    continue;
                }
                let relevance = 0.5 * if substring { 1.0 } else { 0.0 }
                    + 0.3 * overlap
                    + 0.2 * item.recency(now);
                let score = relevance * meta.importance * meta.decay;
                scored.push((*kind, item.id.clone(), relevance, score));
            }
        }

        scored.sort_by(|a, b| b.3.total_cmp(&a.3));
        scored.truncate(options.limit);

        scored
            .into_iter()
            .filter_map(|(kind, id, relevance, score)| {
                let item = self.item_mut(kind, &id)?;
                item.reinforce(now);
                Some(RetrievedMemory {
                    item: item.clone(),
                    relevance,
                    score,
                })
            })
            .collect()
    }

    /// Run the in-memory consolidation steps: pattern and concept
    /// extraction over short-term, promotion (items move to long-term),
    /// near-duplicate merging, association building and decay. Persisting and clearing working memory are left
    /// to the caller.
    pub fn consolidate(&mut self, now: u64) -> ConsolidationReport {
        let mut report = ConsolidationReport {
            patterns: self.extract_patterns(),
            ..Default::default()
        };

        report.concepts = self.extract_concepts();

        let (promote, keep): (VecDeque<MemoryItem>, VecDeque<MemoryItem>) =
            std::mem::take(&mut self.short_term).into_iter().partition(|m| {
                m.metadata.importance > CONSOLIDATION_IMPORTANCE
                    || m.metadata.access_count >= CONSOLIDATION_ACCESSES
            });
        self.short_term = keep;
        report.promoted = promote.len();
        for item in promote {
            self.insert_long_term(MemoryItem {
                kind: MemoryKind::LongTerm,
                ..item
            });
        }

        report.merged = self.merge_long_term();
        report.associations = self.build_associations();
        report.forgotten = self.apply_decay(now);
        self.prune_concepts();

        self.indexes = MemoryIndexes::rebuild(self.all_items(), self.analyzer.as_ref());
        self.last_consolidation = now;
        self.consolidations += 1;
        report
    }

    fn extract_patterns(&mut self) -> usize {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for item in &self.short_term {
            let concepts: BTreeSet<String> = self.analyzer.concepts(&item.content).into_iter().collect();
            for concept in concepts {
                *counts.entry(concept).or_default() += 1;
            }
        }
        let mut found = 0;
        for (concept, count) in counts {
            if count >= PATTERN_MIN_COUNT {
                self.patterns.insert(concept, count);
                found += 1;
            }
        }
        found
    }

    fn merge_long_term(&mut self) -> usize {
        let ids: Vec<String> = self.long_term.keys().cloned().collect();
        let mut removed: BTreeSet<String> = BTreeSet::new();
        let mut merged = 0;

        for (i, keep_id) in ids.iter().enumerate() {
            if removed.contains(keep_id) {
                continue;
            }
            for other_id in &ids[i + 1..] {
                if removed.contains(other_id) {
                    continue;
                }
                let (Some(keep), Some(other)) =
                    (self.long_term.get(keep_id), self.long_term.get(other_id))
                else {
                    continue;
                };
                if self.analyzer.similarity(&keep.content, &other.content) < MERGE_SIMILARITY {
                    continue;
                }
                let Some(other) = self.long_term.remove(other_id) else {
                    continue;
                };
                if let Some(keep) = self.long_term.get_mut(keep_id) {
                    let meta = &mut keep.metadata;
                    meta.importance = meta.importance.max(other.metadata.importance);
                    meta.confidence = meta.confidence.max(other.metadata.confidence);
                    meta.access_count += other.metadata.access_count;
                    meta.last_accessed = meta.last_accessed.max(other.metadata.last_accessed);
                    for association in &other.metadata.associations {
                        keep.associate(association);
                    }
                }
                removed.insert(other_id.clone());
                merged += 1;
            }
        }
        merged
    }

    /// Record the concepts of recent short-term items as references to
    /// their source ids. Items keep their ids when promoted, so the
    /// references survive promotion.
    fn extract_concepts(&mut self) -> usize {
        let mut added = 0;
        for item in self.short_term.iter().rev().take(RECENT_FOR_CONCEPTS) {
            for concept in self.analyzer.concepts(&item.content) {
                let sources = self.concepts.entry(concept).or_default();
                if sources.is_empty() {
                    added += 1;
                }
                sources.insert(item.id.clone());
            }
        }
        added
    }

    /// Drop references to items that were merged away or forgotten.
    fn prune_concepts(&mut self) {
        let live: BTreeSet<String> = self.all_items().map(|m| m.id.clone()).collect();
        for sources in self.concepts.values_mut() {
            sources.retain(|id| live.contains(id));
        }
        self.concepts.retain(|_, sources| !sources.is_empty());
    }

    /// Ids of the items a consolidated concept was extracted from
    pub fn concept_sources(&self, concept: &str) -> Vec<&str> {
        self.concepts
            .get(concept)
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn build_associations(&mut self) -> usize {
        let mut window: Vec<(MemoryKind, String, u64, String)> = self
            .short_term
            .iter()
            .chain(self.long_term.values())
            .map(|m| (m.kind, m.id.clone(), m.metadata.timestamp, m.content.clone()))
            .collect();
        window.sort_by(|a, b| b.2.cmp(&a.2));
        window.truncate(ASSOCIATION_WINDOW);

        let mut links = Vec::new();
        for (i, a) in window.iter().enumerate() {
            for b in &window[i + 1..] {
                if a.1 != b.1 && self.analyzer.similarity(&a.3, &b.3) >= ASSOCIATION_SIMILARITY {
                    links.push(((a.0, a.1.clone()), (b.0, b.1.clone())));
                }
            }
        }

        let mut added = 0;
        for ((kind_a, id_a), (kind_b, id_b)) in links {
            let mut new_link = false;
            if let Some(item) = self.item_mut(kind_a, &id_a)
                && !item.metadata.associations.contains(&id_b)
            {
                item.associate(&id_b);
                new_link = true;
            }
            if let Some(item) = self.item_mut(kind_b, &id_b) {
                item.associate(&id_a);
            }
            if new_link {
                added += 1;
            }
        }
        added
    }

    fn apply_decay(&mut self, now: u64) -> usize {
        for item in self.long_term.values_mut().chain(self.episodic.iter_mut()) {
            item.metadata.decay = item_retention(item, now);
        }
        let before = self.long_term.len();
        self.long_term.retain(|_, m| m.metadata.decay >= FORGET_BELOW);
        before - self.long_term.len()
    }

    pub fn clear_working(&mut self) {
        for item in std::mem::take(&mut self.working) {
            self.indexes.remove(&item.id);
        }
    }

    fn all_items(&self) -> impl Iterator<Item = &MemoryItem> {
        MemoryKind::ALL
            .into_iter()
            .flat_map(move |kind| self.items_of(kind))
    }

    pub fn stats(&self) -> MemoryStats {
        let counts: BTreeMap<MemoryKind, usize> =
            MemoryKind::ALL.into_iter().map(|k| (k, self.len(k))).collect();
        MemoryStats {
            total: counts.values().sum(),
            counts,
            promotions: self.promotions,
            consolidations: self.consolidations,
            patterns: self.patterns.clone(),
        }
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            agent_id: self.agent_id.clone(),
            short_term: self.short_term.iter().cloned().collect(),
            working: self.working.iter().cloned().collect(),
            long_term: self.long_term.values().cloned().collect(),
            episodic: self.episodic.clone(),
            semantic: self.semantic.clone(),
            procedural: self.procedural.values().cloned().collect(),
            sequence: self.sequence,
            patterns: self.patterns.clone(),
            concepts: self.concepts.clone(),
        }
    }

    /// Load a snapshot; indexes are rebuilt when none are supplied.
    pub fn restore(&mut self, snapshot: MemorySnapshot, indexes: Option<MemoryIndexes>) {
        self.indexes = match indexes {
            Some(indexes) => indexes,
            None => rebuild_indexes(&snapshot, self.analyzer.as_ref()),
        };
        self.short_term = snapshot.short_term.into();
        self.working = snapshot.working.into();
        self.long_term = snapshot
            .long_term
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();
        self.episodic = snapshot.episodic;
        self.semantic = snapshot.semantic;
        self.procedural = snapshot
            .procedural
            .into_iter()
            .map(|p| (p.verb.clone(), p))
            .collect();
        self.sequence = self.sequence.max(snapshot.sequence);
        self.patterns = snapshot.patterns;
        self.concepts = snapshot.concepts;
    }
}

/// Rebuild the index artifact from a memory artifact alone
pub fn rebuild_indexes(snapshot: &MemorySnapshot, analyzer: &dyn TextAnalyzer) -> MemoryIndexes {
    MemoryIndexes::rebuild(snapshot.items(), analyzer)
}

/// First significant word, used as the procedure key
fn action_verb(content: &str) -> String {
    content
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| w.len() >= 3)
        .map(str::to_lowercase)
        .unwrap_or_else(|| GENERAL_KEY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::DAY_MS;
    use crate::text::NaiveTextAnalyzer;

    fn bank(capacities: MemoryCapacities) -> AgentMemoryBank {
        AgentMemoryBank::new(
            AgentId::new("analyst-1"),
            capacities,
            Arc::new(NaiveTextAnalyzer::new()),
            0,
        )
    }

    fn quiet() -> MemoryCapacities {
        MemoryCapacities {
            consolidation_interval_ms: u64::MAX,
            ..Default::default()
        }
    }

    #[test]
    fn test_short_term_overflow_promotes_once() {
        let mut bank = bank(quiet());
        let mut promoted = 0;
        for i in 0..101 {
            let receipt = bank.store(
                MemoryKind::ShortTerm,
                format!("observation {i}"),
                StoreRequest::from_source("user"),
                i,
            );
            promoted += receipt.promoted;
        }
        assert_eq!(promoted, 1);
        assert_eq!(bank.len(MemoryKind::ShortTerm), 100);
        assert_eq!(bank.len(MemoryKind::LongTerm), 1);
        assert_eq!(bank.stats().promotions, 1);
    }

    #[test]
    fn test_low_importance_overflow_is_dropped() {
        let mut bank = bank(MemoryCapacities {
            short_term: 2,
            ..quiet()
        });
        for i in 0..3 {
            bank.store(MemoryKind::ShortTerm, format!("note {i}"), StoreRequest::default(), i);
        }
        assert_eq!(bank.len(MemoryKind::ShortTerm), 2);
        assert_eq!(bank.len(MemoryKind::LongTerm), 0);
    }

    #[test]
    fn test_working_spills_to_short_term() {
        let mut bank = bank(MemoryCapacities {
            working: 1,
            ..quiet()
        });
        bank.store(MemoryKind::Working, "draft one", StoreRequest::default(), 1);
        bank.store(MemoryKind::Working, "draft two", StoreRequest::default(), 2);
        assert_eq!(bank.len(MemoryKind::Working), 1);
        assert_eq!(bank.len(MemoryKind::ShortTerm), 1);
    }

    #[test]
    fn test_consolidation_due_thresholds() {
        let mut bank = bank(MemoryCapacities {
            short_term: 5,
            ..quiet()
        });
        let mut due = Vec::new();
        for i in 0..4 {
            due.push(
                bank.store(MemoryKind::ShortTerm, format!("n{i}"), StoreRequest::default(), i)
                    .consolidation_due,
            );
        }
        assert_eq!(due, vec![false, false, false, true]);

        let timed = self::bank(MemoryCapacities {
            consolidation_interval_ms: 1_000,
            ..Default::default()
        });
        assert!(!timed.consolidation_due(999));
        assert!(timed.consolidation_due(1_000));
    }

    #[test]
    fn test_retrieve_ranks_and_reinforces() {
        let mut bank = bank(quiet());
        bank.store(
            MemoryKind::LongTerm,
            "Redis caching cut latency in half",
            StoreRequest::from_source("user"),
            0,
        );
        bank.store(MemoryKind::LongTerm, "Team lunch on Friday", StoreRequest::default(), 0);
        bank.store(MemoryKind::ShortTerm, "caching keys expire hourly", StoreRequest::default(), 0);

        let results = bank.retrieve("caching", &RetrieveOptions::default(), DAY_MS);
        assert_eq!(results.len(), 2);
        assert!(results[0].item.content.starts_with("Redis"));
        assert_eq!(results[0].item.metadata.access_count, 1);

        let only_short = bank.retrieve(
            "caching",
            &RetrieveOptions::default().kinds(&[MemoryKind::ShortTerm]),
            DAY_MS,
        );
        assert_eq!(only_short.len(), 1);
    }

    #[test]
    fn test_procedural_keyed_by_verb() {
        let mut bank = bank(quiet());
        bank.store(MemoryKind::Procedural, "deploy: build image", StoreRequest::default(), 0);
        bank.store(MemoryKind::Procedural, "Deploy: roll out canary", StoreRequest::default(), 1);
        let procedure = bank.procedure("deploy").unwrap();
        assert_eq!(procedure.usage_count, 2);
        assert_eq!(procedure.steps.len(), 2);
    }

    #[test]
    fn test_consolidation_forgets_decayed_long_term() {
        let mut bank = bank(quiet());
        bank.store(MemoryKind::LongTerm, "stale trivia", StoreRequest::default(), 0);
        bank.store(
            MemoryKind::LongTerm,
            "Important: the database must stay in region",
            StoreRequest::from_source("user").with_category("decision"),
            60 * DAY_MS,
        );
        let report = bank.consolidate(61 * DAY_MS);
        assert_eq!(report.forgotten, 1);
        assert_eq!(bank.len(MemoryKind::LongTerm), 1);
        let stats = bank.stats();
        assert_eq!(stats.consolidations, 1);
        let decay_ok = bank
            .snapshot()
            .long_term
            .iter()
            .all(|m| m.metadata.decay >= 0.1 && m.metadata.decay <= 1.0);
        assert!(decay_ok);
    }

    #[test]
    fn test_consolidation_promotes_and_merges() {
        let mut bank = bank(quiet());
        bank.store(
            MemoryKind::ShortTerm,
            "Critical finding: shard orders by customer",
            StoreRequest::from_source("user"),
            0,
        );
        bank.store(MemoryKind::LongTerm, "Use blue green deployments", StoreRequest::default(), 0);
        bank.store(MemoryKind::LongTerm, "use blue green deployments!", StoreRequest::default(), 0);
        let report = bank.consolidate(1);
        assert_eq!(report.promoted, 1);
        assert_eq!(report.merged, 1);
        assert_eq!(bank.len(MemoryKind::ShortTerm), 0);
        assert_eq!(bank.len(MemoryKind::LongTerm), 2);
        assert!(report.concepts > 0);
    }

    #[test]
    fn test_consolidation_keeps_one_copy_per_memory() {
        let mut bank = bank(quiet());
        let id = bank
            .store(
                MemoryKind::ShortTerm,
                "Critical: shard orders by customer",
                StoreRequest::from_source("user"),
                0,
            )
            .id;
        let report = bank.consolidate(1);
        assert_eq!(report.promoted, 1);
        assert!(report.concepts > 0);

        let stats = bank.stats();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.counts[&MemoryKind::ShortTerm], 0);
        assert_eq!(stats.counts[&MemoryKind::LongTerm], 1);
        assert_eq!(stats.counts[&MemoryKind::Semantic], 0);
        assert_eq!(bank.snapshot().item_count(), 1);
        assert_eq!(bank.concept_sources("shard"), vec![id.as_str()]);

        let found = bank.retrieve("shard orders", &RetrieveOptions::default(), 2);
        let ids: Vec<&str> = found.iter().map(|r| r.item.id.as_str()).collect();
        assert_eq!(ids, vec![id.as_str()]);
        assert_eq!(found[0].item.kind, MemoryKind::LongTerm);

        // A second pass finds nothing left to promote
        let again = bank.consolidate(3);
        assert_eq!(again.promoted, 0);
        assert_eq!(bank.stats().total, 1);
    }

    #[test]
    fn test_associations_link_similar_items() {
        let mut bank = bank(quiet());
        let a = bank
            .store(MemoryKind::ShortTerm, "postgres replication lag alerts", StoreRequest::default(), 0)
            .id;
        let b = bank
            .store(MemoryKind::ShortTerm, "postgres replication lag dashboards", StoreRequest::default(), 1)
            .id;
        let report = bank.consolidate(2);
        assert_eq!(report.associations, 1);
        assert!(bank.indexes().associations[&a].contains(&b));
    }

    #[test]
    fn test_clear_working() {
        let mut bank = bank(quiet());
        bank.store(MemoryKind::Working, "scratch", StoreRequest::default(), 0);
        bank.clear_working();
        assert_eq!(bank.len(MemoryKind::Working), 0);
        assert!(bank.indexes().indexed_ids().is_empty());
    }

    #[test]
    fn test_snapshot_restore_round_trip_every_kind() {
        let mut original = bank(quiet());
        for (i, kind) in MemoryKind::ALL.into_iter().enumerate() {
            original.store(kind, format!("{} memory content {i}", kind), StoreRequest::default(), i as u64);
        }
        let snapshot = original.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let loaded: MemorySnapshot = serde_json::from_str(&json).unwrap();

        let mut restored = bank(quiet());
        restored.restore(loaded, None);
        for kind in MemoryKind::ALL {
            assert_eq!(restored.len(kind), original.len(kind), "{kind}");
        }
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.indexes(), original.indexes());

        // New ids continue after restored ones
        let id = restored
            .store(MemoryKind::ShortTerm, "later", StoreRequest::default(), 10)
            .id;
        assert_eq!(id, "analyst-1-short-term-7");
    }
}
