//! Per-provider admission control.
//!
//! A [`RateLimiter`] is constructed by the caller and handed to a run; it is
//! never a process-wide singleton. Each provider gets its own governor
//! bucket (rate over time) and optionally a semaphore capping simultaneous
//! in-flight calls. Per-model buckets can be layered on top.
//!
//! ```text
//! acquire(target)
//!   ├─ provider in-flight slot   (held until the permit is dropped)
//!   ├─ provider bucket           (1 cell)
//!   └─ model bucket              (1 cell, if configured)
//! ```
//!
//! Every wait races against the run's [`CancellationToken`].

mod limit;

pub use limit::RateLimit;

use fanout_domain::Target;
use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

type Bucket<C> =
    governor::RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Why a call could not be admitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("Admission cancelled")]
    Cancelled,

    #[error("No rate limits configured for provider '{0}'")]
    UnknownProvider(String),
}

/// Limits applied to one provider.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProviderLimits {
    pub rate: Option<RateLimit>,
    pub max_in_flight: Option<usize>,
}

impl ProviderLimits {
    pub fn with_rate(mut self, rate: RateLimit) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = Some(max.max(1));
        self
    }
}

/// Static description of every limit a [`RateLimiter`] enforces.
#[derive(Debug, Clone, Default)]
pub struct RateLimitConfig {
    /// Limits keyed by provider id
    pub providers: HashMap<String, ProviderLimits>,
    /// Extra per-model buckets, applied after the provider's
    pub models: HashMap<Target, RateLimit>,
    /// Limits for providers not listed in `providers` (each gets its own copy)
    pub default_provider: Option<ProviderLimits>,
    /// Refuse providers that have neither explicit nor default limits
    pub reject_unknown_providers: bool,
}

impl RateLimitConfig {
    pub fn with_provider(mut self, provider_id: impl Into<String>, limits: ProviderLimits) -> Self {
        self.providers.insert(provider_id.into(), limits);
        self
    }

    pub fn with_model(mut self, target: Target, rate: RateLimit) -> Self {
        self.models.insert(target, rate);
        self
    }

    pub fn with_default_provider(mut self, limits: ProviderLimits) -> Self {
        self.default_provider = Some(limits);
        self
    }

    pub fn rejecting_unknown_providers(mut self) -> Self {
        self.reject_unknown_providers = true;
        self
    }
}

/// Held for the duration of one call attempt; dropping it frees the
/// provider's in-flight slot.
#[derive(Debug)]
pub struct AdmissionPermit {
    _in_flight: Option<OwnedSemaphorePermit>,
}

struct ProviderGate<C: Clock> {
    bucket: Option<Bucket<C>>,
    in_flight: Option<Arc<Semaphore>>,
}

impl<C: Clock> ProviderGate<C> {
    fn new(limits: &ProviderLimits, clock: &C) -> Self {
        Self {
            bucket: limits.rate.and_then(|rate| new_bucket(rate, clock)),
            in_flight: limits.max_in_flight.map(|n| Arc::new(Semaphore::new(n))),
        }
    }
}

fn new_bucket<C: Clock>(rate: RateLimit, clock: &C) -> Option<Bucket<C>> {
    rate.quota()
        .map(|quota| governor::RateLimiter::direct_with_clock(quota, clock))
}

/// Admission control shared by every worker of a run.
///
/// Generic over the governor clock so tests can drive time by hand.
pub struct RateLimiter<C: Clock = DefaultClock> {
    config: RateLimitConfig,
    clock: C,
    gates: Mutex<HashMap<String, Option<Arc<ProviderGate<C>>>>>,
    model_buckets: Mutex<HashMap<Target, Arc<Bucket<C>>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, DefaultClock::default())
    }

    /// Admits everything immediately.
    pub fn unlimited() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(config: RateLimitConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            gates: Mutex::new(HashMap::new()),
            model_buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Wait until a call to `target` may proceed.
    ///
    /// Blocks while the provider (or model) bucket is empty or the provider
    /// is at its in-flight ceiling. Admission order among waiters is not
    /// FIFO, but any waiter is admitted once capacity exists.
    pub async fn acquire(
        &self,
        cancel: &CancellationToken,
        target: &Target,
    ) -> Result<AdmissionPermit, AdmissionError> {
        if cancel.is_cancelled() {
            return Err(AdmissionError::Cancelled);
        }

        let gate = self.gate_for(target.provider_id())?;
        let mut in_flight = None;

        if let Some(gate) = &gate {
            if let Some(semaphore) = &gate.in_flight {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(AdmissionError::Cancelled),
                    permit = Arc::clone(semaphore).acquire_owned() => permit,
                };
                in_flight = Some(permit.map_err(|_| AdmissionError::Cancelled)?);
            }
            if let Some(bucket) = &gate.bucket {
                self.take_cell(bucket, cancel, target).await?;
            }
        }

        if let Some(bucket) = self.model_bucket(target) {
            self.take_cell(&bucket, cancel, target).await?;
        }

        Ok(AdmissionPermit {
            _in_flight: in_flight,
        })
    }

    async fn take_cell(
        &self,
        bucket: &Bucket<C>,
        cancel: &CancellationToken,
        target: &Target,
    ) -> Result<(), AdmissionError> {
        loop {
            let wait = match bucket.check() {
                Ok(_) => return Ok(()),
                Err(not_until) => not_until.wait_time_from(self.clock.now()),
            };

            trace!("Rate limit reached for {}, waiting {:?}", target, wait);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AdmissionError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    fn gate_for(&self, provider_id: &str) -> Result<Option<Arc<ProviderGate<C>>>, AdmissionError> {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(gate) = gates.get(provider_id) {
            return Ok(gate.clone());
        }

        let limits = match self.config.providers.get(provider_id) {
            Some(limits) => Some(limits),
            None => self.config.default_provider.as_ref(),
        };

        let gate = match limits {
            Some(limits) => Some(Arc::new(ProviderGate::new(limits, &self.clock))),
            None if self.config.reject_unknown_providers => {
                return Err(AdmissionError::UnknownProvider(provider_id.to_string()));
            }
            None => None,
        };

        debug!(
            "Initialised admission gate for provider {} (limited: {})",
            provider_id,
            gate.is_some()
        );
        gates.insert(provider_id.to_string(), gate.clone());
        Ok(gate)
    }

    fn model_bucket(&self, target: &Target) -> Option<Arc<Bucket<C>>> {
        let rate = self.config.models.get(target)?;
        let mut buckets = self
            .model_buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(bucket) = buckets.get(target) {
            return Some(Arc::clone(bucket));
        }
        let bucket = Arc::new(new_bucket(*rate, &self.clock)?);
        buckets.insert(target.clone(), Arc::clone(&bucket));
        Some(bucket)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl<C: Clock> std::fmt::Debug for RateLimiter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;
    use std::time::Duration;
    use tokio::time::timeout;

    fn target(provider: &str) -> Target {
        Target::new(provider, "model")
    }

    fn rated(rps: f64, burst: u32) -> ProviderLimits {
        ProviderLimits::default().with_rate(RateLimit::new(rps, burst).unwrap())
    }

    fn limiter(
        provider: &str,
        rps: f64,
        burst: u32,
    ) -> (RateLimiter<FakeRelativeClock>, FakeRelativeClock) {
        let clock = FakeRelativeClock::default();
        let limiter = RateLimiter::with_clock(
            RateLimitConfig::default().with_provider(provider, rated(rps, burst)),
            clock.clone(),
        );
        (limiter, clock)
    }

    async fn admits_now<C: Clock>(limiter: &RateLimiter<C>, target: &Target) -> bool {
        let cancel = CancellationToken::new();
        timeout(Duration::from_millis(10), limiter.acquire(&cancel, target))
            .await
            .is_ok()
    }

    #[tokio::test]
    async fn test_unlimited_admits_immediately() {
        let limiter = RateLimiter::unlimited();
        let cancel = CancellationToken::new();
        for _ in 0..100 {
            limiter.acquire(&cancel, &target("any")).await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_waits_for_refill() {
        let (limiter, clock) = limiter("openai", 1.0, 2);
        let openai = target("openai");

        assert!(admits_now(&limiter, &openai).await);
        assert!(admits_now(&limiter, &openai).await);
        assert!(!admits_now(&limiter, &openai).await);

        clock.advance(Duration::from_millis(500));
        assert!(!admits_now(&limiter, &openai).await);

        clock.advance(Duration::from_millis(500));
        assert!(admits_now(&limiter, &openai).await);
        assert!(!admits_now(&limiter, &openai).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_acquire_completes_once_refilled() {
        let (limiter, clock) = limiter("openai", 1.0, 1);
        let limiter = Arc::new(limiter);
        let cancel = CancellationToken::new();
        limiter.acquire(&cancel, &target("openai")).await.unwrap();

        let waiter = {
            let limiter = Arc::clone(&limiter);
            let cancel = cancel.clone();
            tokio::spawn(async move { limiter.acquire(&cancel, &target("openai")).await })
        };

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!waiter.is_finished());

        clock.advance(Duration::from_secs(1));
        let admitted = timeout(Duration::from_secs(2), waiter).await.unwrap().unwrap();
        assert!(admitted.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_one_rate_refills_over_period() {
        let (limiter, clock) = limiter("slow", 0.5, 1);
        let slow = target("slow");

        assert!(admits_now(&limiter, &slow).await);
        clock.advance(Duration::from_secs(1));
        assert!(!admits_now(&limiter, &slow).await);
        clock.advance(Duration::from_secs(1));
        assert!(admits_now(&limiter, &slow).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_providers_are_independent() {
        let limiter = RateLimiter::with_clock(
            RateLimitConfig::default()
                .with_provider("a", rated(0.01, 1))
                .with_provider("b", rated(0.01, 1)),
            FakeRelativeClock::default(),
        );

        assert!(admits_now(&limiter, &target("a")).await);
        assert!(admits_now(&limiter, &target("b")).await);
        assert!(!admits_now(&limiter, &target("a")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_limits_apply_per_provider() {
        let limiter = RateLimiter::with_clock(
            RateLimitConfig::default().with_default_provider(rated(0.01, 1)),
            FakeRelativeClock::default(),
        );

        assert!(admits_now(&limiter, &target("x")).await);
        assert!(admits_now(&limiter, &target("y")).await);
        assert!(!admits_now(&limiter, &target("x")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_ceiling_released_on_drop() {
        let limiter = RateLimiter::with_clock(
            RateLimitConfig::default()
                .with_provider("p", ProviderLimits::default().with_max_in_flight(1)),
            FakeRelativeClock::default(),
        );
        let cancel = CancellationToken::new();

        let first = limiter.acquire(&cancel, &target("p")).await.unwrap();
        assert!(!admits_now(&limiter, &target("p")).await);

        drop(first);
        assert!(admits_now(&limiter, &target("p")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_model_bucket_layers_on_provider() {
        let judge = Target::new("p", "judge");
        let limiter = RateLimiter::with_clock(
            RateLimitConfig::default().with_model(judge.clone(), RateLimit::new(0.01, 1).unwrap()),
            FakeRelativeClock::default(),
        );

        assert!(admits_now(&limiter, &judge).await);
        assert!(admits_now(&limiter, &target("p")).await);
        assert!(!admits_now(&limiter, &judge).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_wait() {
        let (limiter, _clock) = limiter("p", 0.001, 1);
        let limiter = Arc::new(limiter);
        let cancel = CancellationToken::new();
        limiter.acquire(&cancel, &target("p")).await.unwrap();

        let waiter = {
            let limiter = Arc::clone(&limiter);
            let cancel = cancel.clone();
            tokio::spawn(async move { limiter.acquire(&cancel, &target("p")).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let result = timeout(Duration::from_millis(50), waiter).await.unwrap().unwrap();
        assert_eq!(result.unwrap_err(), AdmissionError::Cancelled);
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected_when_strict() {
        let limiter = RateLimiter::new(
            RateLimitConfig::default()
                .with_provider("known", ProviderLimits::default())
                .rejecting_unknown_providers(),
        );
        let cancel = CancellationToken::new();

        assert!(limiter.acquire(&cancel, &target("known")).await.is_ok());
        assert_eq!(
            limiter.acquire(&cancel, &target("mystery")).await.unwrap_err(),
            AdmissionError::UnknownProvider("mystery".to_string())
        );
    }
}
