//! CLI entrypoint for agent-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{
    ConversationOrchestrator, CouncilConfig, DiscussionInput, DiscussionMode, LlmGateway,
    NoProgress, OrchestrationProgress, OrchestratorError,
};
use council_domain::{ConfigIssue, OutputFormat, Severity, TierRoster};
use council_infrastructure::{
    ConfigLoader, ConfigValidationError, DuckDuckGoSearch, FileConfig, FileMemoryStore,
    JsonlConversationLogger, RoutingGateway,
};
use council_presentation::{Cli, Command, ConsoleFormatter, ProgressReporter, RunArgs};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Initialize logging based on verbosity level, optionally teeing into a
/// daily log file. The returned guard must live until exit.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "agent-council.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    guard
}

fn print_issues(issues: &[ConfigIssue]) {
    for issue in issues {
        match issue.severity {
            Severity::Error => eprintln!("config error: {}", issue.message),
            Severity::Warning => eprintln!("config warning: {}", issue.message),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<(FileConfig, CouncilConfig)> {
    let file_config = ConfigLoader::load(path).context("failed to load configuration")?;
    match file_config.to_council_config() {
        Ok((config, warnings)) => {
            print_issues(&warnings);
            Ok((file_config, config))
        }
        Err(ConfigValidationError::Invalid(errors)) => {
            for error in &errors {
                eprintln!("config error: {}", error);
            }
            bail!("configuration has {} error(s)", errors.len())
        }
        Err(e) => Err(e.into()),
    }
}

fn build_gateway(file_config: &FileConfig, config: &CouncilConfig) -> Result<Arc<RoutingGateway>> {
    let gateway = RoutingGateway::from_config(
        &file_config.providers,
        &config.models,
        config.orchestrator.oracle_timeout,
    )?;
    if gateway.provider_names().is_empty() {
        bail!("no oracle provider is usable; set an API key or configure a local endpoint");
    }
    info!("Providers: {}", gateway.provider_names().join(", "));
    Ok(Arc::new(gateway))
}

fn memory_dir(file_config: &FileConfig) -> Option<PathBuf> {
    file_config
        .memory
        .data_dir()
        .or_else(|| ConfigLoader::data_dir().map(|d| d.join("memory")))
}

fn transcript_path(args: &RunArgs, conversation_id: &str) -> Option<PathBuf> {
    args.transcript.clone().or_else(|| {
        ConfigLoader::data_dir().map(|d| {
            d.join("conversations")
                .join(format!("{conversation_id}.jsonl"))
        })
    })
}

async fn run(cli: &Cli, args: &RunArgs) -> Result<()> {
    let (file_config, mut config) = load_config(cli.config.as_deref())?;
    if !file_config.output.color {
        colored::control::set_override(false);
    }
    if let Some(seed) = args.seed {
        config.orchestrator = config.orchestrator.with_seed(seed);
    }
    if let Some(max) = args.max_iterations {
        config.orchestrator = config.orchestrator.with_max_iterations(max);
    }

    let gateway = build_gateway(&file_config, &config)?;
    let mut orchestrator = ConversationOrchestrator::discover(gateway, config).await?;

    if !args.no_search {
        orchestrator = orchestrator.with_search(Arc::new(DuckDuckGoSearch::new()?));
    }
    if let Some(dir) = memory_dir(&file_config) {
        info!("Agent memories under {}", dir.display());
        orchestrator = orchestrator.with_store(Arc::new(FileMemoryStore::new(dir)));
    }

    let mode: DiscussionMode = args.mode.into();
    let mut input = DiscussionInput::new(args.objective.clone()).with_mode(mode);
    if let Some(complexity) = args.complexity {
        input = input.with_complexity(complexity);
    }
    if let Some(path) = transcript_path(args, &input.conversation_id)
        && let Some(logger) = JsonlConversationLogger::new(&path)
    {
        info!("Transcript: {}", path.display());
        orchestrator = orchestrator.with_logger(Arc::new(logger));
    }

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; stopping the discussion");
            ctrl_c_token.cancel();
        }
    });

    let format = args
        .output
        .map(OutputFormat::from)
        .or(file_config.output.format)
        .unwrap_or_default();
    let reporter = ProgressReporter::new();
    let progress: &dyn OrchestrationProgress =
        if args.quiet || format == OutputFormat::Json || !std::io::stderr().is_terminal() {
            &NoProgress
        } else {
            &reporter
        };

    let output = match orchestrator.execute_with_progress(input, progress, token).await {
        Ok(output) => output,
        Err(OrchestratorError::Cancelled) => bail!("discussion cancelled"),
        Err(e) => return Err(e.into()),
    };

    let rendered = match format {
        OutputFormat::Full => ConsoleFormatter::format(&output),
        OutputFormat::Conclusion => ConsoleFormatter::format_conclusion_only(&output),
        OutputFormat::Json => ConsoleFormatter::format_json(&output),
    };
    println!("{}", rendered);
    Ok(())
}

async fn models(cli: &Cli) -> Result<()> {
    let (file_config, config) = load_config(cli.config.as_deref())?;
    let catalog = if config.models.is_empty() {
        let gateway = build_gateway(&file_config, &config)?;
        gateway.available_models().await?
    } else {
        config.models.clone()
    };
    let roster = TierRoster::classify(&catalog, &config.tiers.free_providers);
    print!("{}", ConsoleFormatter::format_models(&catalog, &roster));
    Ok(())
}

fn show_config(cli: &Cli) -> Result<()> {
    println!("Configuration sources (highest priority first):");
    for source in ConfigLoader::sources(cli.config.as_deref()) {
        let status = if source.found { "found" } else { "not found" };
        match &source.path {
            Some(path) => println!("  {:<12} {} ({})", source.label, path.display(), status),
            None => println!("  {:<12} COUNCIL_* variables ({})", source.label, status),
        }
    }
    if let Some(dir) = ConfigLoader::data_dir() {
        println!("Data directory: {}", dir.display());
    }
    println!();

    let file_config = ConfigLoader::load(cli.config.as_deref())?;
    let issues = file_config.validate();
    if issues.is_empty() {
        println!("Configuration is valid ({} models).", file_config.models.len());
    } else {
        print_issues(&issues);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log_dir.as_deref());

    if cli.no_color {
        colored::control::set_override(false);
    }

    info!("Starting agent-council");

    match &cli.command {
        Command::Run(args) => run(&cli, args).await,
        Command::Models => models(&cli).await,
        Command::Config => show_config(&cli),
    }
}
