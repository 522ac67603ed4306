//! Synthesis use case
//!
//! Consolidates the successful outputs of a run into one answer with a single
//! extra call, driven through the same admission/retry machinery as the
//! fan-out.

use crate::config::RunOptions;
use crate::ports::model_client::ModelClient;
use crate::ports::progress::ProgressNotifier;
use crate::ports::prompt_source::PromptSource;
use crate::use_cases::worker::{AttemptFailure, WorkerContext, run_target};
use fanout_domain::{Phase, Prompt, SkipReason, SynthesisInput, SynthesisOutcome, Target};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Runs the synthesis pass for a completed fan-out.
pub struct SynthesisCoordinator<C: ModelClient + ?Sized + 'static> {
    client: Arc<C>,
}

impl<C: ModelClient + ?Sized + 'static> SynthesisCoordinator<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Build the synthesis prompt from `successful` and call `target`.
    ///
    /// Returns [`SynthesisOutcome::Skipped`] without issuing any call when
    /// there is nothing to synthesize. Inputs are sorted by target before
    /// formatting, so the prompt does not depend on collection order.
    #[allow(clippy::too_many_arguments)]
    pub async fn synthesize(
        &self,
        cancel: &CancellationToken,
        source: &dyn PromptSource,
        original: &Prompt,
        successful: &[SynthesisInput<'_>],
        target: &Target,
        options: &RunOptions,
        progress: &dyn ProgressNotifier,
    ) -> SynthesisOutcome {
        if successful.is_empty() {
            info!("Skipping synthesis: no successful outputs");
            return SynthesisOutcome::Skipped {
                reason: SkipReason::NoSuccessfulInputs,
            };
        }

        let prompt = Self::build_prompt(source, original, successful);

        info!(
            "Phase: Synthesis with {} over {} output(s)",
            target,
            successful.len()
        );
        progress.on_phase_start(&Phase::Synthesis, 1);

        let ctx = WorkerContext::new(Arc::clone(&self.client), options, cancel.clone());
        let on_failure = |failure: &AttemptFailure| {
            progress.on_attempt_failed(
                &failure.target,
                failure.attempt,
                &failure.error,
                failure.retry_in,
            );
        };
        let result = run_target(&ctx, target.clone(), &prompt, &on_failure).await;

        progress.on_target_complete(&Phase::Synthesis, target, result.succeeded());
        progress.on_phase_complete(&Phase::Synthesis);

        SynthesisOutcome::Completed(result)
    }

    /// Deterministic synthesis prompt for a set of successful outputs.
    pub fn build_prompt(
        source: &dyn PromptSource,
        original: &Prompt,
        successful: &[SynthesisInput<'_>],
    ) -> String {
        let mut inputs = successful.to_vec();
        inputs.sort_by(|a, b| a.target.cmp(b.target));
        source.synthesis_prompt(original, &inputs)
    }
}
