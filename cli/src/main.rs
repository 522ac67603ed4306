//! CLI entrypoint for llm-fanout
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use fanout_application::{
    ModelClient, NoProgress, ProgressNotifier, PromptSource, RunFanoutUseCase,
    StaticPromptSource,
};
use fanout_domain::{OutputFormat, Prompt, RunOutcome, Target};
use fanout_infrastructure::{
    ConfigLoader, FileConfig, FilePromptSource, OpenAiCompatibleClient, RoutingModelClient,
    StdinPromptSource,
};
use fanout_presentation::{Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&cli, &mut config);

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("config error: {}", issue);
        }
        bail!("Invalid configuration ({} issue(s))", issues.len());
    }

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    let targets = config.run.parse_targets()?;
    if targets.is_empty() {
        bail!("No targets given. Use -m <provider>/<model> or set [run] targets in fanout.toml");
    }
    let options = config.to_run_options()?;

    info!("Starting llm-fanout with {} target(s)", targets.len());

    // === Dependency Injection ===
    let client = Arc::new(build_client(&config, &targets, options.synthesis_target.as_ref())?);
    let source = prompt_source(&cli)?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling outstanding calls");
                cancel.cancel();
            }
        });
    }

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let use_case = RunFanoutUseCase::new(client);
    let summary = use_case
        .run_with_progress(&cancel, source.as_ref(), targets, options, progress.as_ref())
        .await?;

    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();
    let output = match format {
        OutputFormat::Full => ConsoleFormatter::format(&summary),
        OutputFormat::Synthesis => ConsoleFormatter::format_synthesis_only(&summary),
        OutputFormat::Json => ConsoleFormatter::format_json(&summary),
    };
    println!("{}", output);

    if format == OutputFormat::Synthesis && !cli.quiet {
        eprintln!("{}", ConsoleFormatter::success_line(&summary));
    }

    Ok(ExitCode::from(exit_status(summary.outcome())))
}

/// Install the tracing subscriber. `RUST_LOG` wins over `-v` when set.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            Ok(None)
        }
    }
}

/// CLI flags take precedence over every configuration source.
fn apply_overrides(cli: &Cli, config: &mut FileConfig) {
    if !cli.models.is_empty() {
        config.run.targets = cli.models.clone();
    }
    if let Some(synthesis) = &cli.synthesis {
        config.run.synthesis = Some(synthesis.clone());
    }
    if let Some(max) = cli.max_concurrency {
        config.run.max_concurrency = max;
    }
    if let Some(timeout) = cli.timeout {
        config.run.call_timeout_seconds = Some(timeout);
    }
    if let Some(attempts) = cli.max_attempts {
        config.retry.max_attempts = attempts;
    }
}

/// One HTTP client per provider referenced by the run. Providers without a
/// known or configured base URL are left unregistered, so their targets
/// fail as `not_found` instead of aborting the whole run.
fn build_client(
    config: &FileConfig,
    targets: &[Target],
    synthesis: Option<&Target>,
) -> Result<RoutingModelClient> {
    let providers: BTreeSet<&str> = targets
        .iter()
        .chain(synthesis)
        .map(Target::provider_id)
        .collect();

    let mut router = RoutingModelClient::new();
    for id in providers {
        let provider = config.providers.get(id).cloned().unwrap_or_default();
        let Some(base_url) = provider.resolve_base_url(id) else {
            warn!("No base_url for provider '{}'; its targets will fail", id);
            continue;
        };

        let key_env = provider.resolve_api_key_env(id);
        let api_key = std::env::var(&key_env).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            info!("{} is not set; calling {} without authentication", key_env, id);
        }

        let client: Arc<dyn ModelClient> =
            Arc::new(OpenAiCompatibleClient::new(id, base_url, api_key)?);
        router = router.with_provider(id, client);
    }

    Ok(router)
}

fn prompt_source(cli: &Cli) -> Result<Box<dyn PromptSource>> {
    if let Some(text) = &cli.prompt {
        return Ok(Box::new(StaticPromptSource::new(Prompt::new(text.as_str())?)));
    }
    if let Some(path) = &cli.prompt_file {
        return Ok(Box::new(FilePromptSource::new(path)));
    }
    if std::io::stdin().is_terminal() {
        bail!("No prompt given. Pass it as an argument, with --prompt-file, or on stdin");
    }
    Ok(Box::new(StdinPromptSource))
}

/// 0 all succeeded, 2 partial success, 1 all failed
fn exit_status(outcome: RunOutcome) -> u8 {
    match outcome {
        RunOutcome::AllSucceeded => 0,
        RunOutcome::PartialSuccess => 2,
        RunOutcome::AllFailed => 1,
    }
}
