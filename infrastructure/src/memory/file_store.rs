//! File-backed agent memory persistence.
//!
//! Layout under the data directory:
//!
//! ```text
//! <data_dir>/<agent-id>/memory.json    snapshot of every memory kind
//! <data_dir>/<agent-id>/indexes.json   temporal / semantic / importance / association indexes
//! ```
//!
//! Both files are written through a temporary file and renamed into place.
//! A missing or unreadable index file loads as `None`; the memory service
//! rebuilds indexes from the snapshot in that case.

use async_trait::async_trait;
use council_application::ports::memory_store::{MemoryStore, StoreError, StoredMemory};
use council_domain::{AgentId, MemoryIndexes, MemorySnapshot};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const MEMORY_FILE: &str = "memory.json";
const INDEXES_FILE: &str = "indexes.json";

pub struct FileMemoryStore {
    root: PathBuf,
}

impl FileMemoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one agent; characters outside `[A-Za-z0-9._-]` become `_`
    pub fn agent_dir(&self, agent_id: &AgentId) -> PathBuf {
        let name: String = agent_id
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let name = if name.trim_matches('.').is_empty() {
            "_".to_string()
        } else {
            name
        };
        self.root.join(name)
    }

    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl MemoryStore for FileMemoryStore {
    async fn save(
        &self,
        agent_id: &AgentId,
        snapshot: &MemorySnapshot,
        indexes: &MemoryIndexes,
    ) -> Result<(), StoreError> {
        let dir = self.agent_dir(agent_id);
        fs::create_dir_all(&dir).await?;
        Self::write_json(&dir.join(MEMORY_FILE), snapshot).await?;
        Self::write_json(&dir.join(INDEXES_FILE), indexes).await?;
        debug!("Saved memory for {} to {}", agent_id, dir.display());
        Ok(())
    }

    async fn load(&self, agent_id: &AgentId) -> Result<Option<StoredMemory>, StoreError> {
        let dir = self.agent_dir(agent_id);
        let Some(bytes) = Self::read_optional(&dir.join(MEMORY_FILE)).await? else {
            return Ok(None);
        };
        let snapshot: MemorySnapshot = serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Memory snapshot for {} is unreadable: {}", agent_id, e);
            StoreError::Corrupt(agent_id.to_string())
        })?;

        let indexes = match Self::read_optional(&dir.join(INDEXES_FILE)).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<MemoryIndexes>(&bytes) {
                Ok(indexes) => Some(indexes),
                Err(e) => {
                    warn!("Memory indexes for {} are unreadable, rebuilding: {}", agent_id, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Could not read memory indexes for {}: {}", agent_id, e);
                None
            }
        };

        Ok(Some(StoredMemory { snapshot, indexes }))
    }
}
