//! Lookup indexes over a memory bank.
//!
//! Indexes are derived data: they can always be rebuilt from the items, which
//! is what happens when the persisted index artifact is missing or corrupt.

use super::item::MemoryItem;
use crate::text::TextAnalyzer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryIndexes {
    /// timestamp → item ids
    pub temporal: BTreeMap<u64, BTreeSet<String>>,
    /// concept → item ids
    pub semantic: BTreeMap<String, BTreeSet<String>>,
    /// importance bucket (0-10) → item ids
    pub importance: BTreeMap<u8, BTreeSet<String>>,
    /// item id → associated item ids
    pub associations: BTreeMap<String, BTreeSet<String>>,
}

pub fn importance_bucket(importance: f64) -> u8 {
    (importance.clamp(0.0, 1.0) * 10.0).floor() as u8
}

impl MemoryIndexes {
    pub fn insert(&mut self, item: &MemoryItem, analyzer: &dyn TextAnalyzer) {
        self.temporal
            .entry(item.metadata.timestamp)
            .or_default()
            .insert(item.id.clone());
        for concept in analyzer.concepts(&item.content) {
            self.semantic
                .entry(concept)
                .or_default()
                .insert(item.id.clone());
        }
        self.importance
            .entry(importance_bucket(item.metadata.importance))
            .or_default()
            .insert(item.id.clone());
        if !item.metadata.associations.is_empty() {
            self.associations
                .entry(item.id.clone())
                .or_default()
                .extend(item.metadata.associations.iter().cloned());
        }
    }

    /// Drop an id from every index
    pub fn remove(&mut self, id: &str) {
        fn purge<K: Ord + Clone>(map: &mut BTreeMap<K, BTreeSet<String>>, id: &str) {
            map.values_mut().for_each(|ids| {
                ids.remove(id);
            });
            map.retain(|_, ids| !ids.is_empty());
        }
        purge(&mut self.temporal, id);
        purge(&mut self.semantic, id);
        purge(&mut self.importance, id);
        self.associations.remove(id);
        purge(&mut self.associations, id);
    }

    pub fn link(&mut self, a: &str, b: &str) {
        self.associations
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.associations
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
    }

    pub fn rebuild<'a>(
        items: impl IntoIterator<Item = &'a MemoryItem>,
        analyzer: &dyn TextAnalyzer,
    ) -> Self {
        let mut indexes = Self::default();
        for item in items {
            indexes.insert(item, analyzer);
        }
        indexes
    }

    /// Ids indexed under a concept
    pub fn by_concept(&self, concept: &str) -> Vec<&str> {
        self.semantic
            .get(concept)
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every id referenced by the temporal index
    pub fn indexed_ids(&self) -> BTreeSet<&str> {
        self.temporal
            .values()
            .flat_map(|ids| ids.iter().map(String::as_str))
            .collect()
    }
}
