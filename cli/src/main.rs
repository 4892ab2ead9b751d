//! CLI entrypoint for roundtable
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use roundtable_application::{
    AgentRuntime, DiscussionOptions, SessionController, SummarizationEngine,
};
use roundtable_domain::{AgentId, DiscussionStatus, Model};
use roundtable_infrastructure::{
    ConfigLoader, FileConfig, InMemoryDiscussionStore, InMemoryUsageLedger, JsonlEventLogger,
    OpenAiCompatibleClient, build_personas,
};
use roundtable_presentation::{Cli, ConsolePresenter, run_control_prompt};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        println!("Configuration sources (lowest to highest priority):");
        for source in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("  {}", source);
        }
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let guard = init_tracing(cli.verbose, config.logging.log_dir.as_deref());
    info!("Starting roundtable");

    let issues = config.validate();
    for issue in &issues {
        eprintln!("{}", issue);
    }
    if issues.iter().any(|i| i.is_error()) {
        bail!("Configuration has errors; fix them and try again.");
    }

    let topic = match cli.topic.clone() {
        Some(t) => t,
        None => bail!("A topic is required. Run with --help for usage."),
    };

    let controller = build_controller(&cli, &config)?;

    controller
        .events()
        .subscribe_all(ConsolePresenter::new().quiet(cli.quiet));
    if let Some(path) = cli.event_log.as_ref().or(config.logging.event_log.as_ref()) {
        match JsonlEventLogger::new(path) {
            Some(logger) => {
                controller.events().subscribe_all(logger);
            }
            None => warn!("Event log disabled: cannot open {}", path.display()),
        }
    }

    let options = discussion_options(&cli, &config);
    let id = controller.start_discussion(&topic, cli.context.as_deref(), options)?;

    run_control_prompt(
        controller.clone(),
        BufReader::new(tokio::io::stdin()),
        id.clone(),
    )
    .await;

    let discussion = controller.wait_for_completion(&id).await?;
    let usage = controller.get_token_usage_stats();
    info!(
        status = %discussion.status(),
        total_tokens = usage.total_tokens,
        summarization_tokens = usage.summarization_tokens,
        "Discussion finished"
    );

    let code = match discussion.status() {
        DiscussionStatus::Completed => 0,
        _ => 1,
    };

    drop(guard);
    // The stdin reader may still be blocked on a read; exit without waiting
    // for the runtime to reclaim it.
    std::process::exit(code)
}

/// Console logging by verbosity, plus daily files when `log_dir` is set.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "roundtable.log");
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
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

fn build_controller(cli: &Cli, config: &FileConfig) -> Result<SessionController> {
    // === Dependency Injection ===
    let provider = &config.provider;
    let mut client = OpenAiCompatibleClient::new(
        &provider.base_url,
        Some(Duration::from_secs(provider.timeout_seconds)),
    )
    .context("Failed to create LLM client")?
    .with_provider_name(provider.name.clone());
    match provider.resolve_api_key() {
        Some(key) => client = client.with_api_key(key),
        None => warn!(
            "No API key found in ${}; requests will be sent unauthenticated",
            provider.api_key_env
        ),
    }
    let client = Arc::new(client);

    let default_model = match &cli.model {
        Some(name) => Model::new(name.trim()),
        None => provider.parse_model().0,
    };
    let runtime_config = config
        .runtime
        .to_runtime_config()
        .0
        .with_default_model(default_model);
    let ledger = Arc::new(InMemoryUsageLedger::new());

    let runtime = AgentRuntime::new(client.clone())
        .with_ledger(ledger.clone())
        .with_retry_policy(Arc::new(config.retry.to_backoff().0))
        .with_config(runtime_config.clone());
    let summarizer = SummarizationEngine::new(client)
        .with_ledger(ledger)
        .with_runtime_config(runtime_config);

    let controller = SessionController::new(runtime, summarizer)
        .with_store(Arc::new(InMemoryDiscussionStore::new()));
    controller.update_summarization_config(config.summarization.to_config().0)?;

    let (personas, _) = build_personas(&config.personas);
    for persona in personas {
        controller.register_agent(persona)?;
    }

    Ok(controller)
}

/// Config-file defaults with command-line overrides applied.
fn discussion_options(cli: &Cli, config: &FileConfig) -> DiscussionOptions {
    let mut options = config.discussion.to_options().0;

    if !cli.personas.is_empty() {
        options = options.with_participants(
            cli.personas
                .iter()
                .map(|p| AgentId::from(p.as_str()))
                .collect(),
        );
    }
    if let Some(rounds) = cli.max_rounds {
        options = options.with_max_rounds(rounds);
    }
    if let Some(secs) = cli.time_limit {
        options = options.with_time_limit((secs > 0).then_some(Duration::from_secs(secs)));
    }
    if let Some(tokens) = cli.token_limit {
        options = options.with_token_limit((tokens > 0).then_some(tokens));
    }
    if cli.no_auto_stop {
        options = options.with_auto_stop(false);
    }

    options
}
