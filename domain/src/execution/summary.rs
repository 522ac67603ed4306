//! Run-level aggregate.

use super::result::ModelResult;
use crate::core::target::Target;
use serde::Serialize;
use std::collections::BTreeMap;

/// Overall classification of a run, used by callers to pick an exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    AllSucceeded,
    PartialSuccess,
    AllFailed,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::AllSucceeded => "all_succeeded",
            RunOutcome::PartialSuccess => "partial_success",
            RunOutcome::AllFailed => "all_failed",
        }
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why synthesis did not issue a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoSuccessfulInputs,
}

/// Terminal status of the synthesis pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SynthesisOutcome {
    Skipped { reason: SkipReason },
    Completed(ModelResult),
}

impl SynthesisOutcome {
    pub fn result(&self) -> Option<&ModelResult> {
        match self {
            SynthesisOutcome::Completed(result) => Some(result),
            SynthesisOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, SynthesisOutcome::Skipped { .. })
    }
}

/// One successful output, borrowed from a [`RunSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisInput<'a> {
    pub target: &'a Target,
    pub content: &'a str,
}

/// Aggregate over every target of a run plus the optional synthesis.
///
/// Counts are derived from the results themselves when the summary is
/// built, so `success_count + failed_targets.len() == total_targets`
/// always holds. The synthesis target is reported separately and never
/// counted in `total_targets`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    total_targets: usize,
    success_count: usize,
    failed_targets: Vec<Target>,
    model_results: BTreeMap<Target, ModelResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    synthesis: Option<SynthesisOutcome>,
    outcome: RunOutcome,
}

impl RunSummary {
    /// Build a summary from one result per target.
    pub fn from_results(results: impl IntoIterator<Item = ModelResult>) -> Self {
        let model_results: BTreeMap<Target, ModelResult> = results
            .into_iter()
            .map(|r| (r.target().clone(), r))
            .collect();

        let success_count = model_results.values().filter(|r| r.succeeded()).count();
        let failed_targets: Vec<Target> = model_results
            .values()
            .filter(|r| !r.succeeded())
            .map(|r| r.target().clone())
            .collect();
        let total_targets = model_results.len();

        let outcome = if total_targets > 0 && success_count == total_targets {
            RunOutcome::AllSucceeded
        } else if success_count == 0 {
            RunOutcome::AllFailed
        } else {
            RunOutcome::PartialSuccess
        };

        Self {
            total_targets,
            success_count,
            failed_targets,
            model_results,
            synthesis: None,
            outcome,
        }
    }

    /// Attach the synthesis status. Does not change any primary counts.
    pub fn with_synthesis(mut self, synthesis: SynthesisOutcome) -> Self {
        self.synthesis = Some(synthesis);
        self
    }

    pub fn total_targets(&self) -> usize {
        self.total_targets
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    /// Failed targets in stable (sorted) order
    pub fn failed_targets(&self) -> &[Target] {
        &self.failed_targets
    }

    pub fn model_results(&self) -> &BTreeMap<Target, ModelResult> {
        &self.model_results
    }

    pub fn result_for(&self, target: &Target) -> Option<&ModelResult> {
        self.model_results.get(target)
    }

    /// `None` when no synthesis target was configured
    pub fn synthesis(&self) -> Option<&SynthesisOutcome> {
        self.synthesis.as_ref()
    }

    /// The synthesis call's result, if one was issued
    pub fn synthesis_result(&self) -> Option<&ModelResult> {
        self.synthesis.as_ref().and_then(SynthesisOutcome::result)
    }

    pub fn outcome(&self) -> RunOutcome {
        self.outcome
    }

    /// Successful outputs only, sorted by target.
    pub fn successful_outputs(&self) -> Vec<SynthesisInput<'_>> {
        self.model_results
            .values()
            .filter_map(|r| {
                r.content().map(|content| SynthesisInput {
                    target: r.target(),
                    content,
                })
            })
            .collect()
    }
}
