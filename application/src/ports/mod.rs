//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod conversation_logger;
pub mod knowledge_search;
pub mod llm_gateway;
pub mod memory_store;
pub mod progress;
