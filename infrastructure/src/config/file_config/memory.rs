//! Agent memory settings from TOML (`[memory]` section)

use council_domain::MemoryCapacities;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemoryConfig {
    pub short_term: usize,
    pub working: usize,
    pub episodic: usize,
    pub long_term: usize,
    pub consolidation_interval_secs: u64,
    /// Where agent memories are persisted; `None` keeps memories in process
    pub data_dir: Option<String>,
}

impl Default for FileMemoryConfig {
    fn default() -> Self {
        let capacities = MemoryCapacities::default();
        Self {
            short_term: capacities.short_term,
            working: capacities.working,
            episodic: capacities.episodic,
            long_term: capacities.long_term,
            consolidation_interval_secs: capacities.consolidation_interval_ms / 1000,
            data_dir: None,
        }
    }
}

impl FileMemoryConfig {
    pub fn to_capacities(&self) -> MemoryCapacities {
        MemoryCapacities {
            short_term: self.short_term.max(1),
            working: self.working.max(1),
            episodic: self.episodic.max(1),
            long_term: self.long_term.max(1),
            consolidation_interval_ms: self.consolidation_interval_secs.saturating_mul(1000),
        }
    }

    /// Memory directory with a leading `~/` expanded
    pub fn data_dir(&self) -> Option<PathBuf> {
        let raw = self.data_dir.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None => Some(PathBuf::from(raw)),
        }
    }
}
