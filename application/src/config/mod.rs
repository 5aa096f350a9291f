//! Application-level configuration.
//!
//! - [`OrchestratorParams`]: discussion loop control (iterations, sampling, timeouts)
//! - [`CouncilConfig`]: container for every policy the orchestrator reads

pub mod council_config;
pub mod orchestrator_params;

pub use council_config::CouncilConfig;
pub use orchestrator_params::{DiscussionMode, OrchestratorParams, QUICK_MODE_ITERATIONS};
