//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use triage_application::{TriageConfig, TriageMode};

/// Output format for the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored human-readable summary
    Text,
    /// JSON object on stdout
    Json,
}

impl From<OutputFormat> for triage_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => triage_domain::OutputFormat::Text,
            OutputFormat::Json => triage_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for log-triage
#[derive(Parser, Debug)]
#[command(name = "log-triage")]
#[command(author, version, about = "Two-tier log verdict triage with multi-agent consensus")]
#[command(long_about = r#"
log-triage labels log records as normal (0) or abnormal (1).

A fast gate asks a classifier for a verdict and a second model for its trust
in that verdict. Confident items are accepted; ambiguous ("gray") items are
escalated to a panel of three agents that deliberate for up to three rounds.

Modes:
  detect      Gate, then consensus for gray items
  fuse        Gate only; gray items go to the gray pool
  consensus   Run the consensus panel on every record

Configuration files are loaded from (in priority order):
1. TRIAGE_* environment variables (nested keys separated by "__")
2. --config <path>     Explicit config file
3. ./triage.toml       Project-level config
4. ~/.config/log-triage/config.toml   Global config

Example:
  log-triage detect data/bgl_sample.jsonl
  log-triage --output json fuse data/bgl_sample.jsonl --beta 0.8
  log-triage -vv consensus data/hard_cases.jsonl --max-rounds 5
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Summary format (overrides [output] format)
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Also write diagnostic logs as JSON lines to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration sources and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Gate every record and escalate gray items to consensus
    Detect(RunArgs),
    /// Gate only; gray items are exported for review
    Fuse(RunArgs),
    /// Run the consensus panel on every record
    Consensus(RunArgs),
}

impl Command {
    pub fn mode(&self) -> TriageMode {
        match self {
            Command::Detect(_) => TriageMode::Detect,
            Command::Fuse(_) => TriageMode::Fuse,
            Command::Consensus(_) => TriageMode::Consensus,
        }
    }

    pub fn args(&self) -> &RunArgs {
        match self {
            Command::Detect(args) | Command::Fuse(args) | Command::Consensus(args) => args,
        }
    }
}

/// Arguments shared by every run mode
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// JSONL dataset, one log record per line
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Where to write per-item results (JSON)
    #[arg(long, value_name = "PATH")]
    pub results: Option<PathBuf>,

    /// Where to write the gray pool (JSONL)
    #[arg(long, value_name = "PATH")]
    pub gray_pool: Option<PathBuf>,

    /// Where to write the decision audit log (JSONL)
    #[arg(long, value_name = "PATH")]
    pub audit_log: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,
}

impl RunArgs {
    pub fn dataset(&self) -> &Path {
        &self.dataset
    }
}

/// Threshold and budget overrides applied on top of the loaded configuration
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// Gate: trust at or below which a verdict is rejected (ALPHA)
    #[arg(long, value_name = "X")]
    pub alpha: Option<f64>,

    /// Gate: trust at or above which a verdict is accepted (BETA)
    #[arg(long, value_name = "X")]
    pub beta: Option<f64>,

    /// Consensus: similarity needed for a weighted vote (SIGMA)
    #[arg(long, value_name = "X")]
    pub sigma: Option<f64>,

    /// Consensus: similarity below which feedback is "hard" (GAMMA)
    #[arg(long, value_name = "X")]
    pub gamma: Option<f64>,

    /// Consensus: maximum number of rounds
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<usize>,

    /// Attempts per oracle call
    #[arg(long, value_name = "N")]
    pub max_retry: Option<usize>,

    /// Items processed concurrently
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
}

impl Overrides {
    /// Overwrite every field that was given on the command line
    pub fn apply(&self, config: &mut TriageConfig) {
        if let Some(alpha) = self.alpha {
            config.gate.alpha = alpha;
        }
        if let Some(beta) = self.beta {
            config.gate.beta = beta;
        }
        if let Some(sigma) = self.sigma {
            config.consensus.sigma = sigma;
        }
        if let Some(gamma) = self.gamma {
            config.consensus.gamma = gamma;
        }
        if let Some(rounds) = self.max_rounds {
            config.consensus.max_rounds = rounds;
        }
        if let Some(attempts) = self.max_retry {
            config.retry.max_attempts = attempts;
        }
        if let Some(concurrency) = self.concurrency {
            config.execution.max_concurrent_items = concurrency;
        }
    }
}
