//! Use cases (application services)

pub mod conversation_manager;
pub mod run_discussion;
pub(crate) mod shared;
