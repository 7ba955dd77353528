//! CLI entrypoint for log-triage
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use triage_application::{
    AuditLogger, NoAuditLogger, RunConsensusUseCase, RunGateUseCase, RunTriageInput,
    RunTriageUseCase, TriageMode,
};
use triage_domain::OutputFormat;
use triage_infrastructure::{
    ConfigLoader, FileConfig, JsonlAuditLogger, OracleSet, init_logging, read_dataset,
    write_gray_pool, write_results,
};
use triage_presentation::{Cli, ConsoleFormatter, ProgressReporter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive for the whole run so the log file is flushed
    let _logging = init_logging(cli.verbose, cli.log_file.as_deref());

    info!("Starting log-triage");

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    if cli.show_config {
        return show_config(&cli, &file_config);
    }

    let Some(command) = cli.command.as_ref() else {
        bail!("A mode is required: detect, fuse or consensus. See --help.");
    };
    let mode = command.mode();
    let args = command.args();

    let problems = file_config.validate();
    if !problems.is_empty() {
        let list: Vec<String> = problems.iter().map(|p| format!("  - {}", p)).collect();
        bail!("Invalid configuration:\n{}", list.join("\n"));
    }

    let mut config = file_config.to_triage_config();
    args.overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let format = cli
        .output
        .map(OutputFormat::from)
        .unwrap_or(file_config.output.format);
    if cli.no_color || !file_config.output.color {
        ConsoleFormatter::disable_color();
    }

    let records = read_dataset(args.dataset())?;
    info!(records = records.len(), mode = %mode, "Dataset loaded");

    // === Dependency Injection ===
    let oracles = OracleSet::from_config(&file_config.oracles)?;

    let audit_path = args
        .audit_log
        .clone()
        .or_else(|| file_config.output.audit_log.clone());
    let audit: Arc<dyn AuditLogger> = match audit_path.as_deref().and_then(JsonlAuditLogger::new)
    {
        Some(logger) => {
            info!(path = %logger.path().display(), "Audit log enabled");
            Arc::new(logger)
        }
        None => Arc::new(NoAuditLogger),
    };

    let mut use_case = RunTriageUseCase::new(config.execution).with_audit_logger(audit);
    if matches!(mode, TriageMode::Detect | TriageMode::Fuse) {
        use_case = use_case.with_gate(RunGateUseCase::new(
            oracles.classifier.clone(),
            oracles.trust.clone(),
            config.gate,
            config.retry,
        )
        .with_throttle(oracles.throttle.clone()));
    }
    if matches!(mode, TriageMode::Detect | TriageMode::Consensus) {
        use_case = use_case.with_consensus(RunConsensusUseCase::new(
            oracles.panel.clone(),
            config.consensus,
            config.retry,
            config.execution.round_delay,
        )
        .with_throttle(oracles.throttle.clone()));
    }

    // Ctrl-C stops new items from starting; items in flight finish
    let cancellation = CancellationToken::new();
    let signal_token = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing items in flight");
            signal_token.cancel();
        }
    });

    let input = RunTriageInput::new(records, mode).with_cancellation(cancellation);
    let report = if cli.quiet {
        use_case.execute(input).await?
    } else {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &progress).await?
    };

    let results_path = artifact_path(&args.results, &file_config.output.results);
    let gray_pool_path = artifact_path(&args.gray_pool, &file_config.output.gray_pool);
    write_results(&results_path, &report.items)?;
    write_gray_pool(&gray_pool_path, &report.gray_pool)?;

    match format {
        OutputFormat::Text => {
            println!("{}", ConsoleFormatter::format(&report));
            println!("Results:   {}", results_path.display());
            println!("Gray pool: {}", gray_pool_path.display());
        }
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&report)),
    }

    Ok(())
}

fn artifact_path(flag: &Option<PathBuf>, configured: &Path) -> PathBuf {
    flag.clone().unwrap_or_else(|| configured.to_path_buf())
}

fn show_config(cli: &Cli, config: &FileConfig) -> Result<()> {
    if cli.no_config {
        println!("Configuration sources: built-in defaults only (--no-config)");
    } else {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
    }
    println!();
    println!("Effective configuration:");
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}
