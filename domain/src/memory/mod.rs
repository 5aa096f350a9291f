//! Per-agent layered memory.
//!
//! Each agent owns an [`AgentMemoryBank`] with six kinds of memory:
//! short-term, working, long-term, episodic, semantic and procedural.
//! Items carry an importance score and a decay value from a forgetting
//! curve; consolidation periodically promotes, merges, links and forgets.

mod bank;
mod index;
mod item;

pub use bank::{
    AgentMemoryBank, ConsolidationReport, MemoryCapacities, MemorySnapshot, MemoryStats, Procedure,
    RetrieveOptions, RetrievedMemory, StoreReceipt, rebuild_indexes,
};
pub use index::{MemoryIndexes, importance_bucket};
pub use item::{
    MemoryItem, MemoryKind, MemoryMetadata, StoreRequest, compute_importance, item_retention,
    retention,
};
