//! Configuration file loading for agent-council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `COUNCIL_`-prefixed environment variables (`COUNCIL_ORCHESTRATOR__SEED=7`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./council.toml` or `./.council.toml`
//! 4. Global: `$XDG_CONFIG_HOME/agent-council/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileMemoryConfig, FileModelConfig,
    FileOrchestratorConfig, FileOutputConfig, FileProviderEndpoint, FileProvidersConfig,
    FileRoundsConfig, FileSelectorConfig, FileTiersConfig, parse_catalog,
};
pub use loader::{ConfigLoader, ConfigSource};
