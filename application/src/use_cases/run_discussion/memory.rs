//! Memory service: the agents' memory banks plus their persistence.
//!
//! Banks decide when consolidation is due; this service runs the in-memory
//! steps, persists both artifacts and then clears working memory. A failed
//! write is logged and the agent stays dirty so the next consolidation or
//! flush retries it.

use super::types::OrchestratorError;
use crate::ports::memory_store::MemoryStore;
use crate::use_cases::shared::check_cancelled;
use council_domain::memory::{RetrievedMemory, StoreReceipt};
use council_domain::{
    AgentId, AgentMemoryBank, MemoryCapacities, MemoryKind, MemoryStats, RetrieveOptions,
    StoreRequest, TextAnalyzer,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct MemoryService {
    store: Arc<dyn MemoryStore>,
    capacities: MemoryCapacities,
    analyzer: Arc<dyn TextAnalyzer>,
    banks: BTreeMap<AgentId, AgentMemoryBank>,
    dirty: BTreeSet<AgentId>,
}

impl MemoryService {
    pub fn new(
        store: Arc<dyn MemoryStore>,
        capacities: MemoryCapacities,
        analyzer: Arc<dyn TextAnalyzer>,
    ) -> Self {
        Self {
            store,
            capacities,
            analyzer,
            banks: BTreeMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    /// Open the agent's bank, loading any persisted memory.
    ///
    /// A load failure is logged and the agent starts with an empty bank.
    pub async fn open(
        &mut self,
        agent_id: &AgentId,
        now: u64,
        token: &CancellationToken,
    ) -> Result<(), OrchestratorError> {
        if self.banks.contains_key(agent_id) {
            return Ok(());
        }
        check_cancelled(token)?;
        let mut bank = AgentMemoryBank::new(
            agent_id.clone(),
            self.capacities,
            Arc::clone(&self.analyzer),
            now,
        );
        match self.store.load(agent_id).await {
            Ok(Some(stored)) => {
                if stored.indexes.is_none() {
                    info!("Rebuilding memory indexes for {}", agent_id);
                }
                bank.restore(stored.snapshot, stored.indexes);
                debug!("Loaded {} memories for {}", bank.stats().total, agent_id);
            }
            Ok(None) => {}
            Err(e) => warn!("Could not load memory for {}: {}", agent_id, e),
        }
        self.banks.insert(agent_id.clone(), bank);
        Ok(())
    }

    /// Store a memory; runs consolidation when the bank asks for it
    pub async fn remember(
        &mut self,
        agent_id: &AgentId,
        kind: MemoryKind,
        content: &str,
        request: StoreRequest,
        now: u64,
        token: &CancellationToken,
    ) -> Result<Option<StoreReceipt>, OrchestratorError> {
        let Some(bank) = self.banks.get_mut(agent_id) else {
            warn!("No memory bank for {}", agent_id);
            return Ok(None);
        };
        let receipt = bank.store(kind, content, request, now);
        self.dirty.insert(agent_id.clone());
        if receipt.consolidation_due {
            self.consolidate(agent_id, now, token).await?;
        }
        Ok(Some(receipt))
    }

    /// Consolidate, persist, then clear working memory
    pub async fn consolidate(
        &mut self,
        agent_id: &AgentId,
        now: u64,
        token: &CancellationToken,
    ) -> Result<(), OrchestratorError> {
        let Some(bank) = self.banks.get_mut(agent_id) else {
            return Ok(());
        };
        let report = bank.consolidate(now);
        debug!(
            "Consolidated {}: {} promoted, {} merged, {} forgotten",
            agent_id, report.promoted, report.merged, report.forgotten
        );
        self.dirty.insert(agent_id.clone());
        self.persist(agent_id, token).await?;
        if let Some(bank) = self.banks.get_mut(agent_id) {
            bank.clear_working();
        }
        Ok(())
    }

    /// Write one agent's artifacts; returns whether the write succeeded
    pub async fn persist(
        &mut self,
        agent_id: &AgentId,
        token: &CancellationToken,
    ) -> Result<bool, OrchestratorError> {
        check_cancelled(token)?;
        let Some(bank) = self.banks.get(agent_id) else {
            return Ok(false);
        };
        let snapshot = bank.snapshot();
        match self.store.save(agent_id, &snapshot, bank.indexes()).await {
            Ok(()) => {
                self.dirty.remove(agent_id);
                Ok(true)
            }
            Err(e) => {
                warn!("Could not persist memory for {}: {}", agent_id, e);
                Ok(false)
            }
        }
    }

    /// Persist every agent with unsaved changes
    pub async fn flush(&mut self, token: &CancellationToken) -> Result<usize, OrchestratorError> {
        let pending: Vec<AgentId> = self.dirty.iter().cloned().collect();
        let mut written = 0;
        for agent_id in pending {
            if self.persist(&agent_id, token).await? {
                written += 1;
            }
        }
        Ok(written)
    }

    pub fn recall(
        &mut self,
        agent_id: &AgentId,
        query: &str,
        options: &RetrieveOptions,
        now: u64,
    ) -> Vec<RetrievedMemory> {
        let Some(bank) = self.banks.get_mut(agent_id) else {
            return Vec::new();
        };
        let results = bank.retrieve(query, options, now);
        if !results.is_empty() {
            self.dirty.insert(agent_id.clone());
        }
        results
    }

    pub fn is_dirty(&self, agent_id: &AgentId) -> bool {
        self.dirty.contains(agent_id)
    }

    pub fn stats(&self) -> BTreeMap<AgentId, MemoryStats> {
        self.banks
            .iter()
            .map(|(id, bank)| (id.clone(), bank.stats()))
            .collect()
    }
}
