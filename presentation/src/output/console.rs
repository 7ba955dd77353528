//! Console output for triage runs

use crate::progress::reporter::status_label;
use colored::Colorize;
use triage_application::{ItemStatus, TriageReport, TriageSummary};
use triage_domain::util::truncate_str;

/// Failed items listed individually before the list is cut off
const MAX_LISTED_FAILURES: usize = 10;
const ERROR_PREVIEW_BYTES: usize = 100;

/// Formats run reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Turn off ANSI colors for every later formatting call
    pub fn disable_color() {
        colored::control::set_override(false);
    }

    /// Human-readable summary of a finished run
    pub fn format(report: &TriageReport) -> String {
        let summary = report.summary();
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Triage Summary ({})", summary.mode)));
        output.push('\n');

        output.push_str(&format!(
            "{} {} / {} processed",
            "Items:".cyan().bold(),
            summary.processed,
            summary.total
        ));
        if summary.cancelled {
            output.push_str(&format!(" {}", "(cancelled)".yellow()));
        }
        output.push_str("\n\n");

        output.push_str(&Self::section_header("Status"));
        for status in ItemStatus::ALL {
            let count = summary.counts.get(status);
            if count > 0 {
                output.push_str(&format!("  {:<24} {:>6}\n", status_label(status), count));
            }
        }

        output.push_str(&Self::format_metrics(&summary));

        output.push_str(&format!(
            "\n{} {} items\n",
            "Gray pool:".cyan().bold(),
            summary.gray_pool
        ));

        let failures: Vec<_> = report
            .items
            .iter()
            .filter(|item| item.status.is_oracle_failure())
            .collect();
        if !failures.is_empty() {
            output.push_str(&Self::section_header("Oracle failures"));
            for item in failures.iter().take(MAX_LISTED_FAILURES) {
                output.push_str(&format!(
                    "  #{:<6} {}\n",
                    item.index,
                    truncate_str(item.error.as_deref().unwrap_or("unknown"), ERROR_PREVIEW_BYTES)
                ));
            }
            if failures.len() > MAX_LISTED_FAILURES {
                output.push_str(&format!(
                    "  {}\n",
                    format!("... and {} more", failures.len() - MAX_LISTED_FAILURES).dimmed()
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Summary as pretty JSON
    pub fn format_json(report: &TriageReport) -> String {
        serde_json::to_string_pretty(&report.summary()).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_metrics(summary: &TriageSummary) -> String {
        if summary.evaluated == 0 {
            return format!(
                "\n{}\n",
                "No ground truth in dataset; evaluation skipped.".dimmed()
            );
        }

        let m = &summary.metrics;
        let mut output = Self::section_header(&format!(
            "Evaluation ({} labelled items)",
            summary.evaluated
        ));
        output.push_str(&format!(
            "  TP {:<6} FP {:<6} FN {:<6} TN {:<6}\n",
            m.counts.tp, m.counts.fp, m.counts.fn_, m.counts.tn
        ));
        output.push_str(&format!(
            "  {} {:.3}   {} {:.3}   {} {:.3}\n",
            "precision".bold(),
            m.precision,
            "recall".bold(),
            m.recall,
            "f1".bold(),
            m.f1
        ));
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
