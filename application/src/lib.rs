//! Application layer for agent-council
//!
//! This crate contains the discussion use cases, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CouncilConfig, DiscussionMode, OrchestratorParams};
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, EventKind, NoConversationLogger},
    knowledge_search::{KnowledgeSearch, NoKnowledgeSearch, SearchError, SearchResult},
    llm_gateway::{GatewayError, LlmGateway, OracleRequest, OracleResponse, TokenUsage},
    memory_store::{InMemoryStore, MemoryStore, NoMemoryStore, StoreError, StoredMemory},
    progress::{NoProgress, OrchestrationProgress},
};
pub use use_cases::conversation_manager::{ConversationId, ConversationManager, ConversationStatus};
pub use use_cases::run_discussion::{
    ConversationOrchestrator, DiscussionEnd, DiscussionInput, DiscussionOutput, ModelUsage,
    OrchestratorError,
};
