//! Per-target worker loop shared by the fan-out and synthesis phases.
//!
//! One call to [`run_target`] drives one target from `Pending` to a terminal
//! state: admission → invoke → (retry after backoff)* → result. Attempts
//! for the same target are strictly sequential, and every suspension point
//! (admission, the call itself, backoff) races the run's cancellation token.

use crate::config::{RetryDecision, RetryPolicy, RunOptions};
use crate::ports::model_client::ModelClient;
use crate::rate_limit::{AdmissionError, RateLimiter};
use fanout_domain::{
    CallOutcome, CategorizedError, Content, ModelResult, Target, WorkerState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// A failed attempt, reported while the worker is still running.
#[derive(Debug, Clone)]
pub(crate) struct AttemptFailure {
    pub(crate) target: Target,
    pub(crate) attempt: u32,
    pub(crate) error: CategorizedError,
    /// `None` when the failure is final
    pub(crate) retry_in: Option<Duration>,
}

/// Everything a worker needs, shared by all workers of one phase.
pub(crate) struct WorkerContext<C: ModelClient + ?Sized> {
    client: Arc<C>,
    rate_limiter: Arc<RateLimiter>,
    retry_policy: RetryPolicy,
    call_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl<C: ModelClient + ?Sized> WorkerContext<C> {
    pub(crate) fn new(client: Arc<C>, options: &RunOptions, cancel: CancellationToken) -> Self {
        Self {
            client,
            rate_limiter: Arc::clone(&options.rate_limiter),
            retry_policy: options.retry_policy.clone(),
            call_timeout: options.call_timeout,
            cancel,
        }
    }
}

/// Drive `target` to a terminal state and return its single result.
pub(crate) async fn run_target<C: ModelClient + ?Sized>(
    ctx: &WorkerContext<C>,
    target: Target,
    prompt: &str,
    on_failure: &(dyn Fn(&AttemptFailure) + Send + Sync),
) -> ModelResult {
    let mut state = WorkerState::Pending;
    let mut attempt_log = Vec::new();
    let mut attempt: u32 = 0;

    loop {
        let permit = match ctx.rate_limiter.acquire(&ctx.cancel, &target).await {
            Ok(permit) => permit,
            Err(AdmissionError::Cancelled) => {
                advance(&mut state, WorkerState::PermanentlyFailed, &target);
                return ModelResult::failure(target, CategorizedError::cancelled(), attempt_log);
            }
            Err(e @ AdmissionError::UnknownProvider(_)) => {
                warn!("Target {} rejected at admission: {}", target, e);
                advance(&mut state, WorkerState::PermanentlyFailed, &target);
                return ModelResult::failure(
                    target,
                    CategorizedError::not_found(e.to_string()),
                    attempt_log,
                );
            }
        };

        advance(&mut state, WorkerState::Attempting, &target);
        attempt += 1;
        let outcome = invoke_once(ctx, &target, prompt, attempt).await;
        drop(permit);
        attempt_log.push(outcome.record());

        let error = match outcome.result {
            Ok(content) => {
                debug!("Target {} succeeded on attempt {}", target, attempt);
                advance(&mut state, WorkerState::Succeeded, &target);
                return ModelResult::success(target, content, attempt_log);
            }
            Err(error) => error,
        };

        match ctx.retry_policy.decide(&error, attempt) {
            RetryDecision::Retry { delay } if !ctx.cancel.is_cancelled() => {
                debug!(
                    "Target {} attempt {} failed ({}), retrying in {:?}",
                    target, attempt, error, delay
                );
                on_failure(&AttemptFailure {
                    target: target.clone(),
                    attempt,
                    error,
                    retry_in: Some(delay),
                });
                advance(&mut state, WorkerState::Retrying, &target);

                tokio::select! {
                    biased;
                    _ = ctx.cancel.cancelled() => {
                        advance(&mut state, WorkerState::PermanentlyFailed, &target);
                        return ModelResult::failure(
                            target,
                            CategorizedError::cancelled(),
                            attempt_log,
                        );
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            _ => {
                warn!(
                    "Target {} failed after {} attempt(s): {}",
                    target, attempt, error
                );
                on_failure(&AttemptFailure {
                    target: target.clone(),
                    attempt,
                    error: error.clone(),
                    retry_in: None,
                });
                advance(&mut state, WorkerState::PermanentlyFailed, &target);
                return ModelResult::failure(target, error, attempt_log);
            }
        }
    }
}

/// One call, bounded by the optional per-call timeout and the run's
/// cancellation. Blank text is treated as a rejection, not a success.
async fn invoke_once<C: ModelClient + ?Sized>(
    ctx: &WorkerContext<C>,
    target: &Target,
    prompt: &str,
    attempt: u32,
) -> CallOutcome {
    let started = Instant::now();

    let call = async {
        let call = ctx.client.invoke(target, prompt, &ctx.cancel);
        match ctx.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(CategorizedError::transient(format!(
                    "call timed out after {:?}",
                    limit
                ))),
            },
            None => call.await,
        }
    };

    let result = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => Err(CategorizedError::cancelled()),
        result = call => result,
    };

    let result = result.and_then(|text| {
        Content::new(text).ok_or_else(|| CategorizedError::content_rejected("empty response"))
    });

    CallOutcome {
        target: target.clone(),
        attempt,
        duration: started.elapsed(),
        result,
    }
}

fn advance(state: &mut WorkerState, next: WorkerState, target: &Target) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid worker transition {:?} -> {:?}",
        state,
        next
    );
    trace!("Target {}: {:?} -> {:?}", target, state, next);
    *state = next;
}
