//! Service checker — one sequential pass over all endpoints.

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use uptick_core::{CheckBatch, CheckResult, Service, UptickConfig, endpoint_count};
use uptick_probe::{IdentityRotator, Probe, RetryPolicy, RetryingProbe};

/// Checks every configured endpoint, strictly one request at a time.
pub struct ServiceChecker<P> {
    services: Vec<Service>,
    retrying: RetryingProbe<P>,
    /// Held for a whole cycle, so two cycles never interleave.
    rotation: Mutex<IdentityRotator>,
}

impl<P: Probe> ServiceChecker<P> {
    pub fn new(services: Vec<Service>, retrying: RetryingProbe<P>, rotator: IdentityRotator) -> Self {
        Self {
            services,
            retrying,
            rotation: Mutex::new(rotator),
        }
    }

    /// Build a checker for the services, retry policy and identities in `config`.
    pub fn from_config(config: &UptickConfig, probe: P) -> Self {
        Self::new(
            config.services(),
            RetryingProbe::new(probe, RetryPolicy::from_config(config)),
            IdentityRotator::new(config.user_agents.clone(), config.request_delay()),
        )
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn endpoint_count(&self) -> usize {
        endpoint_count(&self.services)
    }

    /// Run one cycle and return its batch, in configured order.
    ///
    /// The throttle delay is applied between endpoints; no delay follows
    /// the last endpoint since no request comes after it.
    pub async fn run_cycle(&self) -> CheckBatch {
        let mut rotation = self.rotation.lock().await;
        let delay = rotation.throttle_delay();
        let total = self.endpoint_count();
        let mut batch = CheckBatch::with_capacity(Utc::now(), total);

        for service in &self.services {
            debug!(
                service = %service.name,
                endpoints = service.endpoints.len(),
                "checking service"
            );

            for url in &service.endpoints {
                let identity = rotation.next_identity();
                let result = self.retrying.check(&service.name, url, &identity).await;
                log_result(&result);
                batch.push(result);

                if batch.len() < total && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        batch
    }
}

fn log_result(result: &CheckResult) {
    if result.is_up() {
        info!(
            service = %result.service,
            url = %result.url,
            status = %result.status,
            code = ?result.status_code,
            latency_ms = result.response_time_ms,
            "{} {} - {} - {}ms",
            result.status.symbol(),
            result.service,
            result.url,
            result.response_time_ms,
        );
    } else {
        let reason = result
            .error
            .map(|e| e.label())
            .unwrap_or(result.status.label());
        warn!(
            service = %result.service,
            url = %result.url,
            status = %result.status,
            code = ?result.status_code,
            error = reason,
            latency_ms = result.response_time_ms,
            "{} {} - {} - {}",
            result.status.symbol(),
            result.service,
            result.url,
            reason,
        );
    }
}
