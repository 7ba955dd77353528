//! Progress reporting for triage runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use triage_application::{ItemResult, ItemStatus, ProgressNotifier, TriageMode};
use triage_domain::ConsensusPhase;
use triage_domain::util::truncate_str;

/// Longest error text shown next to a failed item
const ERROR_PREVIEW_BYTES: usize = 80;

/// Reports progress with an indicatif bar (stderr)
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Status with a color matching how much attention it needs
pub(crate) fn status_label(status: ItemStatus) -> colored::ColoredString {
    match status {
        ItemStatus::AcceptBlack | ItemStatus::AcceptWhite => status.as_str().green(),
        ItemStatus::ConsensusHard | ItemStatus::ConsensusWeak => status.as_str().cyan(),
        ItemStatus::Unresolved => status.as_str().yellow(),
        ItemStatus::OracleAFailed | ItemStatus::OracleBFailed => status.as_str().red(),
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_run_start(&self, mode: TriageMode, total_items: usize) {
        let bar = ProgressBar::new(total_items as u64);
        bar.set_style(Self::bar_style());
        bar.set_prefix(mode.as_str().to_string());
        bar.set_message("Starting...");
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_item_complete(&self, result: &ItemResult) {
        self.with_bar(|bar| {
            bar.set_message(format!("#{} {}", result.index, status_label(result.status)));
            bar.inc(1);
        });
    }

    fn on_consensus_phase(&self, index: usize, phase: ConsensusPhase) {
        self.with_bar(|bar| bar.set_message(format!("#{} {}", index, phase)));
    }

    fn on_run_complete(&self, processed: usize, cancelled: bool) {
        if let Ok(mut guard) = self.bar.lock()
            && let Some(bar) = guard.take()
        {
            if cancelled {
                bar.abandon_with_message(format!(
                    "{} after {} items",
                    "Cancelled".yellow(),
                    processed
                ));
            } else {
                bar.finish_with_message(format!("{}", "complete!".green()));
            }
        }
    }
}

/// Simple line-based progress (no fancy UI), written to stderr
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_run_start(&self, mode: TriageMode, total_items: usize) {
        eprintln!("{} {} ({} items)", "->".cyan(), mode.as_str().bold(), total_items);
    }

    fn on_item_complete(&self, result: &ItemResult) {
        match &result.error {
            Some(error) if result.status.is_oracle_failure() => eprintln!(
                "  {} #{} {}: {}",
                "x".red(),
                result.index,
                status_label(result.status),
                truncate_str(error, ERROR_PREVIEW_BYTES)
            ),
            _ => eprintln!(
                "  {} #{} {}",
                "v".green(),
                result.index,
                status_label(result.status)
            ),
        }
    }

    fn on_run_complete(&self, processed: usize, cancelled: bool) {
        if cancelled {
            eprintln!("{} after {} items", "Cancelled".yellow(), processed);
        }
        eprintln!();
    }
}
