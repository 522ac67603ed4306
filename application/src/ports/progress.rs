//! Progress notification port
//!
//! Defines the interface for reporting progress during a run.

use fanout_domain::{CategorizedError, Phase, Target};
use std::time::Duration;

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer. All callbacks are made
/// from the task driving the run, never from worker tasks.
pub trait ProgressNotifier: Send + Sync {
    /// Called when a phase starts
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize);

    /// Called after a failed attempt. `retry_in` is `None` when the failure
    /// is final.
    fn on_attempt_failed(
        &self,
        _target: &Target,
        _attempt: u32,
        _error: &CategorizedError,
        _retry_in: Option<Duration>,
    ) {
    }

    /// Called when a target reaches a terminal state
    fn on_target_complete(&self, phase: &Phase, target: &Target, success: bool);

    /// Called when a phase completes
    fn on_phase_complete(&self, phase: &Phase);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_phase_start(&self, _phase: &Phase, _total_tasks: usize) {}
    fn on_target_complete(&self, _phase: &Phase, _target: &Target, _success: bool) {}
    fn on_phase_complete(&self, _phase: &Phase) {}
}
