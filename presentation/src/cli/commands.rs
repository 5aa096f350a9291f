//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use council_application::DiscussionMode;
use council_domain::OutputFormat;
use std::path::PathBuf;

/// Output format for a finished discussion
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// Objective, agents, rounds, votes and the conclusion
    Full,
    /// Only the conclusion
    Conclusion,
    /// JSON output
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Full => OutputFormat::Full,
            OutputFormatArg::Conclusion => OutputFormat::Conclusion,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Run until the council votes to stop
    Autonomous,
    /// At most three iterations
    Quick,
}

impl From<ModeArg> for DiscussionMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Autonomous => DiscussionMode::Autonomous,
            ModeArg::Quick => DiscussionMode::Quick,
        }
    }
}

/// CLI arguments for agent-council
#[derive(Parser, Debug)]
#[command(name = "agent-council")]
#[command(author, version, about = "A council of role-specialized LLM agents discusses an objective")]
#[command(long_about = r#"
Agent Council assembles a team of role-specialized agents (architect,
researcher, analyst, ...), binds each to a model from your catalog and lets
them discuss an objective round by round until a sample of models votes
that the work is done.

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables
2. --config <path>                          Explicit config file
3. ./council.toml                           Project-level config
4. ~/.config/agent-council/config.toml      Global config

Example:
  agent-council run "Design a rate limiter for our public API"
  agent-council run --mode quick -o json "Compare Raft and Paxos for our metadata store"
  agent-council models
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for daily diagnostic log files
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a discussion on an objective
    Run(RunArgs),
    /// Show the model catalog classified into tiers
    Models,
    /// Show configuration file locations and validation results
    Config,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// The objective for the council
    pub objective: String,

    /// Discussion mode
    #[arg(long, value_enum, default_value = "autonomous")]
    pub mode: ModeArg,

    /// Complexity hint (1-10) used when models cannot analyze the objective
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub complexity: Option<u8>,

    /// Seed for reproducible model rotation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the iteration ceiling
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<u32>,

    /// Output format (defaults to the config file's, then "conclusion")
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormatArg>,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write the conversation transcript (JSONL) to this file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Disable the web research action
    #[arg(long)]
    pub no_search: bool,
}
