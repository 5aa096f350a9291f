//! Memory persistence port
//!
//! Each agent's memory is persisted as two artifacts written together: the
//! memory snapshot and its indexes. They load independently; a missing or
//! unreadable index artifact comes back as `None` and is rebuilt by the
//! caller.

use async_trait::async_trait;
use council_domain::{AgentId, MemoryIndexes, MemorySnapshot};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt memory artifact for agent {0}")]
    Corrupt(String),
}

/// What a load returns
#[derive(Debug, Clone)]
pub struct StoredMemory {
    pub snapshot: MemorySnapshot,
    /// `None` when the index artifact is missing or unreadable
    pub indexes: Option<MemoryIndexes>,
}

#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn save(
        &self,
        agent_id: &AgentId,
        snapshot: &MemorySnapshot,
        indexes: &MemoryIndexes,
    ) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing was stored for the agent
    async fn load(&self, agent_id: &AgentId) -> Result<Option<StoredMemory>, StoreError>;
}

/// Store that keeps nothing
pub struct NoMemoryStore;

#[async_trait]
impl MemoryStore for NoMemoryStore {
    async fn save(
        &self,
        _agent_id: &AgentId,
        _snapshot: &MemorySnapshot,
        _indexes: &MemoryIndexes,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    async fn load(&self, _agent_id: &AgentId) -> Result<Option<StoredMemory>, StoreError> {
        Ok(None)
    }
}

/// Process-local store, used in tests and quick runs
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<AgentId, (MemorySnapshot, MemoryIndexes)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn save(
        &self,
        agent_id: &AgentId,
        snapshot: &MemorySnapshot,
        indexes: &MemoryIndexes,
    ) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Corrupt(agent_id.to_string()))?;
        entries.insert(agent_id.clone(), (snapshot.clone(), indexes.clone()));
        Ok(())
    }

    async fn load(&self, agent_id: &AgentId) -> Result<Option<StoredMemory>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Corrupt(agent_id.to_string()))?;
        Ok(entries.get(agent_id).map(|(snapshot, indexes)| StoredMemory {
            snapshot: snapshot.clone(),
            indexes: Some(indexes.clone()),
        }))
    }
}
