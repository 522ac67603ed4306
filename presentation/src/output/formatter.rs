//! Output formatter trait

use fanout_domain::RunSummary;

/// Trait for formatting run summaries
pub trait OutputFormatter {
    /// Every target's outcome, the synthesis, and a success count
    fn format(&self, summary: &RunSummary) -> String;

    /// Format as JSON
    fn format_json(&self, summary: &RunSummary) -> String;

    /// Synthesis only, or the successful outputs when there is none
    fn format_synthesis_only(&self, summary: &RunSummary) -> String;
}
