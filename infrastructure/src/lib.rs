//! Infrastructure layer for agent-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration file loading.

pub mod config;
pub mod logging;
pub mod memory;
pub mod providers;
pub mod search;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigSource, ConfigValidationError, FileConfig, FileMemoryConfig,
    FileModelConfig, FileOutputConfig, FileProvidersConfig,
};
pub use logging::JsonlConversationLogger;
pub use memory::FileMemoryStore;
pub use providers::{OpenAiCompatibleProvider, ProviderAdapter, RoutingGateway};
pub use search::DuckDuckGoSearch;
