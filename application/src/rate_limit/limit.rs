//! Rate ceilings expressed as governor quotas.

use governor::Quota;
use std::num::NonZeroU32;
use std::time::Duration;

/// Slowest replenish interval accepted for one request.
const MAX_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Rate ceiling for one provider or model.
///
/// Replenishes one request every `period` and lets up to `burst` requests
/// through back to back when the bucket is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    period: Duration,
    burst: NonZeroU32,
}

impl RateLimit {
    /// `None` unless the rate maps to a period between one nanosecond and
    /// one day, and the burst is non-zero.
    pub fn new(requests_per_second: f64, burst: u32) -> Option<Self> {
        Some(Self {
            period: period_for(requests_per_second)?,
            burst: NonZeroU32::new(burst)?,
        })
    }

    /// Steady rate with a burst of one.
    pub fn per_second(requests_per_second: f64) -> Option<Self> {
        Self::new(requests_per_second, 1)
    }

    /// Whether `requests_per_second` can be enforced at all.
    pub fn is_valid_rate(requests_per_second: f64) -> bool {
        period_for(requests_per_second).is_some()
    }

    pub(super) fn quota(&self) -> Option<Quota> {
        Quota::with_period(self.period).map(|quota| quota.allow_burst(self.burst))
    }
}

fn period_for(requests_per_second: f64) -> Option<Duration> {
    if !(requests_per_second.is_finite() && requests_per_second > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / requests_per_second)
        .ok()
        .filter(|period| !period.is_zero() && *period <= MAX_PERIOD)
}
