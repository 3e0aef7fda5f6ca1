//! Bounded retries with exponential backoff.

use std::time::Duration;

use tracing::{debug, warn};

use uptick_core::{CheckResult, UptickConfig};

use crate::probe::Probe;

/// How many attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per endpoint, including the first.
    pub attempts: u32,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Backoff before the second attempt; doubles after each failure.
    pub base_delay: Duration,
    /// Cap on a single backoff sleep.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            timeout: Duration::from_secs(10),
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &UptickConfig) -> Self {
        Self {
            attempts: config.retry_attempts,
            timeout: config.timeout(),
            base_delay: config.retry_base_delay(),
            max_delay: config.max_retry_delay(),
        }
    }

    /// Sleep after the failed attempt at `attempt_index` (0-based).
    pub fn delay_after(&self, attempt_index: u32) -> Duration {
        backoff_delay(self.base_delay, self.max_delay, attempt_index)
    }
}

/// `base * 2^attempt_index`, capped at `max`.
pub fn backoff_delay(base: Duration, max: Duration, attempt_index: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt_index);
    base.saturating_mul(factor).min(max)
}

/// Wraps a [`Probe`] with retries; produces one verdict per endpoint.
pub struct RetryingProbe<P> {
    probe: P,
    policy: RetryPolicy,
}

impl<P: Probe> RetryingProbe<P> {
    pub fn new(probe: P, policy: RetryPolicy) -> Self {
        Self { probe, policy }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Probe `url` until it is UP or the attempts run out.
    ///
    /// The verdict comes from the first successful attempt, or from the
    /// last attempt when all of them fail.
    pub async fn check(&self, service: &str, url: &str, identity: &str) -> CheckResult {
        let attempts = self.policy.attempts.max(1);
        let mut attempt = 0;

        loop {
            let outcome = self.probe.probe(url, self.policy.timeout, identity).await;

            if outcome.is_up() {
                debug!(
                    %service,
                    %url,
                    attempt = attempt + 1,
                    status = ?outcome.status_code,
                    latency_ms = outcome.latency.as_millis() as u64,
                    "probe attempt succeeded"
                );
                return CheckResult::from_outcome(service, outcome);
            }

            let is_last = attempt + 1 >= attempts;
            let delay = (!is_last).then(|| self.policy.delay_after(attempt));

            warn!(
                %service,
                %url,
                attempt = attempt + 1,
                of = attempts,
                error = ?outcome.error,
                status = ?outcome.status_code,
                detail = outcome.detail.as_deref().unwrap_or(""),
                retry_in_ms = delay.map(|d| d.as_millis() as u64),
                "probe attempt failed"
            );

            match delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return CheckResult::from_outcome(service, outcome),
            }
            attempt += 1;
        }
    }
}
