//! Console output formatter for run summaries

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use fanout_domain::{ModelResult, RunOutcome, RunSummary, SkipReason, SynthesisOutcome};

/// Formats run summaries for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete run summary
    pub fn format(summary: &RunSummary) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Fan-out Results"));
        output.push('\n');

        let targets: Vec<String> = summary
            .model_results()
            .keys()
            .map(ToString::to_string)
            .collect();
        output.push_str(&format!(
            "{} {}\n",
            "Targets:".cyan().bold(),
            targets.join(", ")
        ));

        output.push_str(&Self::section_header("Responses"));
        for result in summary.model_results().values() {
            output.push_str(&Self::format_result(result));
        }

        if let Some(synthesis) = summary.synthesis() {
            output.push_str(&Self::section_header("Synthesis"));
            match synthesis {
                SynthesisOutcome::Completed(result) => {
                    output.push_str(&Self::format_result(result));
                }
                SynthesisOutcome::Skipped { reason } => {
                    output.push_str(&format!(
                        "\n{} {}\n",
                        "Skipped:".yellow().bold(),
                        Self::skip_reason(*reason)
                    ));
                }
            }
        }

        output.push_str(&Self::footer(summary));

        output
    }

    /// Format as JSON
    pub fn format_json(summary: &RunSummary) -> String {
        serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format synthesis only (concise output)
    pub fn format_synthesis_only(summary: &RunSummary) -> String {
        if let Some(text) = summary.synthesis_result().and_then(ModelResult::content) {
            return format!("{}\n", text);
        }

        let outputs = summary.successful_outputs();
        if outputs.is_empty() {
            return format!("{}\n", "No successful outputs.".red());
        }

        let mut output = String::new();
        for input in outputs {
            output.push_str(&format!(
                "{}\n{}\n\n",
                format!("── {} ──", input.target).yellow().bold(),
                input.content
            ));
        }
        output
    }

    /// `"N/M models succeeded"`, colored by outcome
    pub fn success_line(summary: &RunSummary) -> String {
        let line = format!(
            "{}/{} models succeeded",
            summary.success_count(),
            summary.total_targets()
        );
        match summary.outcome() {
            RunOutcome::AllSucceeded => line.green().bold().to_string(),
            RunOutcome::PartialSuccess => line.yellow().bold().to_string(),
            RunOutcome::AllFailed => line.red().bold().to_string(),
        }
    }

    fn format_result(result: &ModelResult) -> String {
        let title = format!("── {} ──", result.target());
        match (result.content(), result.final_error()) {
            (Some(content), _) => {
                let mut section = format!("\n{}\n{}\n", title.yellow().bold(), content);
                if result.attempts() > 1 {
                    section.push_str(&format!(
                        "{}\n",
                        format!("(succeeded after {} attempts)", result.attempts()).dimmed()
                    ));
                }
                section
            }
            (None, Some(error)) => format!(
                "\n{}\n{} [{}] {} {}\n",
                title.red().bold(),
                "Error".red(),
                error.category,
                error.message,
                format!("({} attempt(s))", result.attempts()).dimmed()
            ),
            (None, None) => format!("\n{}\n", title.red().bold()),
        }
    }

    fn skip_reason(reason: SkipReason) -> &'static str {
        match reason {
            SkipReason::NoSuccessfulInputs => "no target produced an output",
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer(summary: &RunSummary) -> String {
        format!(
            "\n{}\n{}\n",
            Self::success_line(summary),
            "=".repeat(60).cyan()
        )
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, summary: &RunSummary) -> String {
        Self::format(summary)
    }

    fn format_json(&self, summary: &RunSummary) -> String {
        Self::format_json(summary)
    }

    fn format_synthesis_only(&self, summary: &RunSummary) -> String {
        Self::format_synthesis_only(summary)
    }
}
