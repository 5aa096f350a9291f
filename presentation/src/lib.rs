//! Presentation layer for agent-council
//!
//! This crate contains the CLI definition, the outcome formatter and the
//! progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, ModeArg, OutputFormatArg, RunArgs};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
