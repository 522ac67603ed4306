//! Run Fan-out use case
//!
//! The execution orchestrator: sends one prompt to every target under a
//! global concurrency cap, collects one [`ModelResult`] per target, and
//! optionally hands the successful outputs to the [`SynthesisCoordinator`].
//!
//! ```text
//! validate → spawn one worker per target (bounded by a semaphore)
//!          → workers report over one channel → single collector
//!          → join barrier → RunSummary → (synthesis)
//! ```

use crate::config::RunOptions;
use crate::ports::model_client::ModelClient;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::prompt_source::{PromptSource, PromptSourceError, StaticPromptSource};
use crate::use_cases::synthesize::SynthesisCoordinator;
use crate::use_cases::worker::{AttemptFailure, WorkerContext, run_target};
use fanout_domain::{
    CategorizedError, ErrorCategory, ModelResult, Phase, Prompt, RunSummary, Target,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Caller-level errors. Per-target failures are reported in the
/// [`RunSummary`], never here.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("No targets given")]
    NoTargets,

    #[error("Duplicate target: {0}")]
    DuplicateTarget(Target),

    #[error("No target was admitted by the rate limiter")]
    NothingAdmitted,

    #[error(transparent)]
    Prompt(#[from] PromptSourceError),
}

/// Messages from workers to the collector.
enum WorkerEvent {
    AttemptFailed(AttemptFailure),
    Finished(ModelResult),
}

/// Use case for running one prompt against many targets
pub struct RunFanoutUseCase<C: ModelClient + ?Sized + 'static> {
    client: Arc<C>,
}

impl<C: ModelClient + ?Sized + 'static> RunFanoutUseCase<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Run with an in-memory prompt, the default synthesis template and no
    /// progress reporting.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        prompt: Prompt,
        targets: Vec<Target>,
        options: RunOptions,
    ) -> Result<RunSummary, RunError> {
        let source = StaticPromptSource::new(prompt);
        self.run_with_progress(cancel, &source, targets, options, &NoProgress)
            .await
    }

    /// Run with an explicit prompt source and progress callbacks.
    pub async fn run_with_progress(
        &self,
        cancel: &CancellationToken,
        source: &dyn PromptSource,
        targets: Vec<Target>,
        options: RunOptions,
        progress: &dyn ProgressNotifier,
    ) -> Result<RunSummary, RunError> {
        Self::validate(&targets)?;
        let prompt = source.base_prompt()?;

        info!(
            "Starting fan-out to {} target(s), max concurrency {}",
            targets.len(),
            options.max_concurrency
        );

        let results = self
            .phase_fanout(cancel, &prompt, &targets, &options, progress)
            .await;

        if Self::nothing_admitted(&results) {
            return Err(RunError::NothingAdmitted);
        }

        let summary = RunSummary::from_results(results);
        info!(
            "Fan-out complete: {}/{} target(s) succeeded",
            summary.success_count(),
            summary.total_targets()
        );

        let Some(synthesis_target) = &options.synthesis_target else {
            return Ok(summary);
        };

        let outcome = SynthesisCoordinator::new(Arc::clone(&self.client))
            .synthesize(
                cancel,
                source,
                &prompt,
                &summary.successful_outputs(),
                synthesis_target,
                &options,
                progress,
            )
            .await;

        Ok(summary.with_synthesis(outcome))
    }

    fn validate(targets: &[Target]) -> Result<(), RunError> {
        if targets.is_empty() {
            return Err(RunError::NoTargets);
        }
        let mut seen = HashSet::with_capacity(targets.len());
        for target in targets {
            if !seen.insert(target) {
                return Err(RunError::DuplicateTarget(target.clone()));
            }
        }
        Ok(())
    }

    /// True when every target was turned away before making a single call
    /// for a reason other than cancellation.
    fn nothing_admitted(results: &[ModelResult]) -> bool {
        !results.is_empty()
            && results.iter().all(|r| {
                r.attempts() == 0
                    && r
                        .final_error()
                        .is_some_and(|e| e.category == ErrorCategory::NotFound)
            })
    }

    /// Phase 1: drive every target concurrently and collect one result each
    async fn phase_fanout(
        &self,
        cancel: &CancellationToken,
        prompt: &Prompt,
        targets: &[Target],
        options: &RunOptions,
        progress: &dyn ProgressNotifier,
    ) -> Vec<ModelResult> {
        progress.on_phase_start(&Phase::Fanout, targets.len());

        let slots = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
        let ctx = Arc::new(WorkerContext::new(
            Arc::clone(&self.client),
            options,
            cancel.clone(),
        ));
        let prompt: Arc<str> = Arc::from(prompt.content());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut join_set = JoinSet::new();

        for target in targets {
            let tx = tx.clone();
            let slots = Arc::clone(&slots);
            let ctx = Arc::clone(&ctx);
            let prompt = Arc::clone(&prompt);
            let cancel = cancel.clone();
            let target = target.clone();

            join_set.spawn(async move {
                let result = match Self::acquire_slot(slots, &cancel).await {
                    Some(_slot) => {
                        let on_failure = |failure: &AttemptFailure| {
                            let _ = tx.send(WorkerEvent::AttemptFailed(failure.clone()));
                        };
                        run_target(&ctx, target, &prompt, &on_failure).await
                    }
                    None => ModelResult::not_started(target, CategorizedError::cancelled()),
                };
                let _ = tx.send(WorkerEvent::Finished(result));
            });
        }
        drop(tx);

        let mut results: HashMap<Target, ModelResult> = HashMap::with_capacity(targets.len());
        while let Some(event) = rx.recv().await {
            match event {
                WorkerEvent::AttemptFailed(failure) => {
                    progress.on_attempt_failed(
                        &failure.target,
                        failure.attempt,
                        &failure.error,
                        failure.retry_in,
                    );
                }
                WorkerEvent::Finished(result) => {
                    if result.succeeded() {
                        info!("Target {} responded successfully", result.target());
                    } else {
                        debug!("Target {} finished without output", result.target());
                    }
                    progress.on_target_complete(&Phase::Fanout, result.target(), result.succeeded());
                    results.insert(result.target().clone(), result);
                }
            }
        }

        // Workers are never aborted, so a missing report means a panic.
        while let Some(joined) = join_set.join_next().await {
            if let Err(e) = joined {
                error!("Worker task failed: {}", e);
            }
        }

        progress.on_phase_complete(&Phase::Fanout);

        targets
            .iter()
            .map(|target| {
                results.remove(target).unwrap_or_else(|| {
                    warn!("Worker for {} exited without reporting", target);
                    ModelResult::not_started(
                        target.clone(),
                        CategorizedError::server_error("worker panicked before reporting"),
                    )
                })
            })
            .collect()
    }

    async fn acquire_slot(
        slots: Arc<Semaphore>,
        cancel: &CancellationToken,
    ) -> Option<OwnedSemaphorePermit> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            permit = slots.acquire_owned() => permit.ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::rate_limit::{RateLimitConfig, RateLimiter};
    use async_trait::async_trait;
    use fanout_domain::{RunOutcome, SkipReason, SynthesisOutcome};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // ==================== Test Doubles ====================

    #[derive(Clone)]
    enum Step {
        Reply(&'static str),
        Fail(ErrorCategory),
        Hang,
        Sleep(Duration, &'static str),
        Panic,
    }

    /// Replays a per-target script of replies and failures.
    struct ScriptedClient {
        scripts: Mutex<HashMap<Target, VecDeque<Step>>>,
        calls: Mutex<Vec<(Target, String)>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl ScriptedClient {
        fn new() -> Self {
            Self {
                scripts: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
            }
        }

        fn script(self, target: &Target, steps: Vec<Step>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(target.clone(), steps.into());
            self
        }

        fn calls_to(&self, target: &Target) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(t, _)| t == target)
                .map(|(_, p)| p.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn invoke(
            &self,
            target: &Target,
            prompt: &str,
            _cancel: &CancellationToken,
        ) -> Result<String, CategorizedError> {
            self.calls
                .lock()
                .unwrap()
                .push((target.clone(), prompt.to_string()));
            let step = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(target)
                .and_then(|s| s.pop_front());

            match step {
                Some(Step::Reply(text)) => Ok(text.to_string()),
                Some(Step::Fail(category)) => {
                    Err(CategorizedError::new(category, format!("scripted {category}")))
                }
                Some(Step::Hang) => std::future::pending().await,
                Some(Step::Panic) => panic!("client blew up"),
                Some(Step::Sleep(delay, text)) => {
                    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(delay).await;
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(text.to_string())
                }
                None => Err(CategorizedError::not_found("no script for target")),
            }
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        failures: Mutex<Vec<(Target, u32, ErrorCategory, Option<Duration>)>>,
        completed: Mutex<Vec<(Phase, Target, bool)>>,
    }

    impl ProgressNotifier for RecordingProgress {
        fn on_phase_start(&self, _phase: &Phase, _total_tasks: usize) {}

        fn on_attempt_failed(
            &self,
            target: &Target,
            attempt: u32,
            error: &CategorizedError,
            retry_in: Option<Duration>,
        ) {
            self.failures
                .lock()
                .unwrap()
                .push((target.clone(), attempt, error.category, retry_in));
        }

        fn on_target_complete(&self, phase: &Phase, target: &Target, success: bool) {
            self.completed
                .lock()
                .unwrap()
                .push((*phase, target.clone(), success));
        }

        fn on_phase_complete(&self, _phase: &Phase) {}
    }

    fn t(name: &str) -> Target {
        Target::new("test", name)
    }

    fn prompt() -> Prompt {
        Prompt::new("What is the capital of France?").unwrap()
    }

    fn fast_retries() -> RunOptions {
        RunOptions::default().with_retry_policy(
            RetryPolicy::default()
                .with_base_delay(Duration::from_millis(10))
                .with_jitter(0.0),
        )
    }

    fn assert_counts_consistent(summary: &RunSummary) {
        assert_eq!(
            summary.success_count() + summary.failed_targets().len(),
            summary.total_targets()
        );
    }

    // ==================== Validation ====================

    #[tokio::test]
    async fn test_empty_targets_rejected() {
        let use_case = RunFanoutUseCase::new(Arc::new(ScriptedClient::new()));
        let err = use_case
            .run(&CancellationToken::new(), prompt(), vec![], RunOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::NoTargets));
    }

    #[tokio::test]
    async fn test_duplicate_targets_rejected_before_any_call() {
        let client = Arc::new(ScriptedClient::new().script(&t("a"), vec![Step::Reply("x")]));
        let use_case = RunFanoutUseCase::new(Arc::clone(&client));
        let err = use_case
            .run(
                &CancellationToken::new(),
                prompt(),
                vec![t("a"), t("b"), t("a")],
                RunOptions::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::DuplicateTarget(ref d) if *d == t("a")));
        assert!(client.calls.lock().unwrap().is_empty());
    }

    // ==================== Partial Failure ====================

    #[tokio::test(start_paused = true)]
    async fn test_mixed_outcomes_end_to_end() {
        let client = Arc::new(
            ScriptedClient::new()
                .script(&t("a"), vec![Step::Reply("alpha")])
                .script(
                    &t("b"),
                    vec![
                        Step::Fail(ErrorCategory::Transient),
                        Step::Fail(ErrorCategory::Transient),
                        Step::Reply("beta"),
                    ],
                )
                .script(&t("c"), vec![Step::Fail(ErrorCategory::Auth)]),
        );
        let use_case = RunFanoutUseCase::new(Arc::clone(&client));

        let summary = use_case
            .run(
                &CancellationToken::new(),
                prompt(),
                vec![t("a"), t("b"), t("c")],
                fast_retries(),
            )
            .await
            .unwrap();

        assert_eq!(summary.total_targets(), 3);
        assert_eq!(summary.success_count(), 2);
        assert_eq!(summary.failed_targets(), &[t("c")]);
        assert_counts_consistent(&summary);
        assert_eq!(summary.outcome(), RunOutcome::PartialSuccess);

        let b = summary.result_for(&t("b")).unwrap();
        assert!(b.succeeded());
        assert_eq!(b.attempts(), 3);
        assert_eq!(b.content(), Some("beta"));
        assert_eq!(
            b.attempt_log()
                .iter()
                .map(|r| r.category)
                .collect::<Vec<_>>(),
            vec![Some(ErrorCategory::Transient), Some(ErrorCategory::Transient), None]
        );

        let c = summary.result_for(&t("c")).unwrap();
        assert_eq!(c.attempts(), 1);
        assert_eq!(c.final_error().unwrap().category, ErrorCategory::Auth);
        assert_eq!(c.content(), None);
        assert_eq!(client.calls_to(&t("c")).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted_surface_last_error() {
        let client = Arc::new(ScriptedClient::new().script(
            &t("flaky"),
            vec![
                Step::Fail(ErrorCategory::Transient),
                Step::Fail(ErrorCategory::RateLimited),
                Step::Fail(ErrorCategory::ServerError),
                Step::Reply("too late"),
            ],
        ));
        let use_case = RunFanoutUseCase::new(Arc::clone(&client));

        let summary = use_case
            .run(&CancellationToken::new(), prompt(), vec![t("flaky")], fast_retries())
            .await
            .unwrap();

        let result = summary.result_for(&t("flaky")).unwrap();
        assert!(!result.succeeded());
        assert_eq!(result.attempts(), 3);
        assert_eq!(result.final_error().unwrap().category, ErrorCategory::ServerError);
        assert_eq!(summary.outcome(), RunOutcome::AllFailed);
    }

    #[tokio::test]
    async fn test_empty_reply_is_content_rejected() {
        let client = Arc::new(
            ScriptedClient::new()
                .script(&t("blank"), vec![Step::Reply("   ")])
                .script(&t("ok"), vec![Step::Reply("fine")]),
        );
        let use_case = RunFanoutUseCase::new(client);

        let summary = use_case
            .run(
                &CancellationToken::new(),
                prompt(),
                vec![t("blank"), t("ok")],
                RunOptions::default(),
            )
            .await
            .unwrap();

        let blank = summary.result_for(&t("blank")).unwrap();
        assert!(!blank.succeeded());
        assert_eq!(blank.attempts(), 1);
        assert_eq!(blank.final_error().unwrap().category, ErrorCategory::ContentRejected);
        assert_eq!(summary.success_count(), 1);
        assert_eq!(summary.successful_outputs().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout_is_transient_and_retried() {
        let client = Arc::new(ScriptedClient::new().script(
            &t("slow"),
            vec![Step::Hang, Step::Hang, Step::Reply("finally")],
        ));
        let use_case = RunFanoutUseCase::new(client);

        let summary = use_case
            .run(
                &CancellationToken::new(),
                prompt(),
                vec![t("slow")],
                fast_retries().with_call_timeout(Some(Duration::from_millis(100))),
            )
            .await
            .unwrap();

        let result = summary.result_for(&t("slow")).unwrap();
        assert!(result.succeeded());
        assert_eq!(result.attempts(), 3);
        assert_eq!(result.attempt_log()[0].category, Some(ErrorCategory::Transient));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_sees_every_attempt_failure() {
        let client = Arc::new(
            ScriptedClient::new()
                .script(
                    &t("b"),
                    vec![
                        Step::Fail(ErrorCategory::Transient),
                        Step::Fail(ErrorCategory::Transient),
                        Step::Reply("beta"),
                    ],
                )
                .script(&t("c"), vec![Step::Fail(ErrorCategory::Auth)]),
        );
        let use_case = RunFanoutUseCase::new(client);
        let progress = RecordingProgress::default();
        let source = StaticPromptSource::new(prompt());

        use_case
            .run_with_progress(
                &CancellationToken::new(),
                &source,
                vec![t("b"), t("c")],
                fast_retries(),
                &progress,
            )
            .await
            .unwrap();

        let mut failures = progress.failures.lock().unwrap().clone();
        failures.sort_by(|x, y| (&x.0, x.1).cmp(&(&y.0, y.1)));
        assert_eq!(failures.len(), 3);
        assert_eq!(failures[0].0, t("b"));
        assert!(failures[0].3.is_some());
        assert!(failures[1].3.is_some());
        assert_eq!(failures[2], (t("c"), 1, ErrorCategory::Auth, None));

        let completed = progress.completed.lock().unwrap();
        assert_eq!(completed.len(), 2);
        assert!(completed.contains(&(Phase::Fanout, t("b"), true)));
        assert!(completed.contains(&(Phase::Fanout, t("c"), false)));
    }

    // ==================== Concurrency ====================

    #[tokio::test(start_paused = true)]
    async fn test_global_concurrency_cap() {
        let targets: Vec<Target> = (0..12).map(|i| t(&format!("m{i}"))).collect();
        let mut client = ScriptedClient::new();
        for target in &targets {
            client = client.script(target, vec![Step::Sleep(Duration::from_millis(50), "ok")]);
        }
        let client = Arc::new(client);
        let use_case = RunFanoutUseCase::new(Arc::clone(&client));

        let summary = use_case
            .run(
                &CancellationToken::new(),
                prompt(),
                targets,
                RunOptions::default().with_max_concurrency(3),
            )
            .await
            .unwrap();

        assert_eq!(summary.success_count(), 12);
        let peak = client.peak_in_flight.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak in flight was {peak}");
        assert!(peak >= 2, "workers never overlapped");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_fails_every_pending_target() {
        let targets: Vec<Target> = (0..5).map(|i| t(&format!("hang{i}"))).collect();
        let mut client = ScriptedClient::new();
        for target in &targets {
            client = client.script(target, vec![Step::Hang]);
        }
        let use_case = RunFanoutUseCase::new(Arc::new(client));
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                cancel.cancel();
            })
        };

        let summary = tokio::time::timeout(
            Duration::from_secs(1),
            use_case.run(&cancel, prompt(), targets.clone(), RunOptions::default()),
        )
        .await
        .expect("run did not observe cancellation")
        .unwrap();
        canceller.await.unwrap();

        assert_eq!(summary.total_targets(), 5);
        assert_eq!(summary.success_count(), 0);
        assert_eq!(summary.failed_targets().len(), 5);
        assert_counts_consistent(&summary);
        for target in &targets {
            let result = summary.result_for(target).unwrap();
            assert_eq!(result.final_error().unwrap().category, ErrorCategory::Cancelled);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_reaches_queued_and_backing_off_workers() {
        let targets: Vec<Target> = (0..4).map(|i| t(&format!("w{i}"))).collect();
        let mut client = ScriptedClient::new();
        for target in &targets {
            client = client.script(target, vec![Step::Fail(ErrorCategory::ServerError); 3]);
        }
        let use_case = RunFanoutUseCase::new(Arc::new(client));
        let cancel = CancellationToken::new();
        let options = RunOptions::default()
            .with_max_concurrency(1)
            .with_retry_policy(RetryPolicy::default().with_jitter(0.0));

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                cancel.cancel();
            })
        };

        let summary = use_case
            .run(&cancel, prompt(), targets, options)
            .await
            .unwrap();
        canceller.await.unwrap();

        assert_eq!(summary.success_count(), 0);
        assert_counts_consistent(&summary);
        let started: Vec<_> = summary
            .model_results()
            .values()
            .filter(|r| r.attempts() > 0)
            .collect();
        assert_eq!(started.len(), 1);
        assert!(summary.model_results().values().all(|r| {
            r.final_error().unwrap().category == ErrorCategory::Cancelled
        }));
    }

    #[tokio::test]
    async fn test_nothing_admitted_is_a_hard_error() {
        let limiter = RateLimiter::new(RateLimitConfig::default().rejecting_unknown_providers());
        let client = Arc::new(ScriptedClient::new().script(&t("a"), vec![Step::Reply("x")]));
        let use_case = RunFanoutUseCase::new(Arc::clone(&client));

        let err = use_case
            .run(
                &CancellationToken::new(),
                prompt(),
                vec![t("a"), t("b")],
                RunOptions::default().with_rate_limiter(Arc::new(limiter)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::NothingAdmitted));
        assert!(client.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_panicked_worker_is_reported_as_server_error() {
        let client = Arc::new(
            ScriptedClient::new()
                .script(&t("ok"), vec![Step::Reply("fine")])
                .script(&t("boom"), vec![Step::Panic]),
        );
        let use_case = RunFanoutUseCase::new(Arc::clone(&client));

        let summary = use_case
            .run(
                &CancellationToken::new(),
                prompt(),
                vec![t("ok"), t("boom")],
                fast_retries(),
            )
            .await
            .unwrap();

        assert_eq!(summary.success_count(), 1);
        assert_eq!(summary.failed_targets(), &[t("boom")]);
        let error = summary.model_results()[&t("boom")].final_error().unwrap();
        assert_eq!(error.category, ErrorCategory::ServerError);
        assert!(error.message.contains("panicked"));
        assert_counts_consistent(&summary);
    }

    // ==================== Synthesis ====================

    #[tokio::test]
    async fn test_partial_success_with_synthesis() {
        let judge = Target::new("judge", "d");
        let client = Arc::new(
            ScriptedClient::new()
                .script(&t("a"), vec![Step::Reply("Paris, from A")])
                .script(&t("b"), vec![Step::Reply("Paris, from B")])
                .script(&t("c"), vec![Step::Fail(ErrorCategory::NotFound)])
                .script(&judge, vec![Step::Reply("Paris")]),
        );
        let use_case = RunFanoutUseCase::new(Arc::clone(&client));

        let summary = use_case
            .run(
                &CancellationToken::new(),
                prompt(),
                vec![t("a"), t("b"), t("c")],
                RunOptions::default().with_synthesis_target(judge.clone()),
            )
            .await
            .unwrap();

        assert_eq!(summary.total_targets(), 3);
        assert_eq!(summary.success_count(), 2);
        assert_eq!(summary.model_results().len(), 3);
        assert!(summary.result_for(&judge).is_none());

        let synthesis = summary.synthesis_result().unwrap();
        assert!(synthesis.succeeded());
        assert_eq!(synthesis.content(), Some("Paris"));

        let judge_prompts = client.calls_to(&judge);
        assert_eq!(judge_prompts.len(), 1);
        assert!(judge_prompts[0].contains("Paris, from A"));
        assert!(judge_prompts[0].contains("Paris, from B"));
        assert!(!judge_prompts[0].contains("test/c"));
        assert!(judge_prompts[0].contains("What is the capital of France?"));
    }

    #[tokio::test]
    async fn test_synthesis_skipped_when_everything_failed() {
        let judge = Target::new("judge", "d");
        let client = Arc::new(
            ScriptedClient::new()
                .script(&t("a"), vec![Step::Fail(ErrorCategory::Auth)])
                .script(&t("b"), vec![Step::Fail(ErrorCategory::ContentRejected)])
                .script(&judge, vec![Step::Reply("should not be called")]),
        );
        let use_case = RunFanoutUseCase::new(Arc::clone(&client));

        let summary = use_case
            .run(
                &CancellationToken::new(),
                prompt(),
                vec![t("a"), t("b")],
                RunOptions::default().with_synthesis_target(judge.clone()),
            )
            .await
            .unwrap();

        assert_eq!(summary.outcome(), RunOutcome::AllFailed);
        assert_eq!(
            summary.synthesis(),
            Some(&SynthesisOutcome::Skipped {
                reason: SkipReason::NoSuccessfulInputs
            })
        );
        assert!(client.calls_to(&judge).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthesis_failure_keeps_primary_results() {
        let judge = Target::new("judge", "d");
        let client = Arc::new(
            ScriptedClient::new()
                .script(&t("a"), vec![Step::Reply("alpha")])
                .script(&judge, vec![Step::Fail(ErrorCategory::Auth)]),
        );
        let use_case = RunFanoutUseCase::new(client);

        let summary = use_case
            .run(
                &CancellationToken::new(),
                prompt(),
                vec![t("a")],
                fast_retries().with_synthesis_target(judge),
            )
            .await
            .unwrap();

        assert_eq!(summary.outcome(), RunOutcome::AllSucceeded);
        assert_eq!(summary.success_count(), 1);
        let synthesis = summary.synthesis_result().unwrap();
        assert!(!synthesis.succeeded());
        assert_eq!(synthesis.final_error().unwrap().category, ErrorCategory::Auth);
    }
}
