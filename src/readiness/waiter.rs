//! Readiness waiter.
//!
//! # Responsibilities
//! - Probe a target until it is ready
//! - Pace retries with the configured backoff
//! - Fail with `Timeout` once the time or attempt budget is spent
//!
//! # Design Decisions
//! - A reachable target returns on the first attempt, without sleeping
//! - Every probe failure is retried; only the budget ends the wait
//! - Sleeps never overshoot the remaining budget

use std::time::Duration;

use crate::config::{BackoffKind, WaitConfig};
use crate::error::BootstrapError;
use crate::net::{ConnectionTarget, Probe, TargetProbe};
use crate::observability::metrics;
use crate::readiness::clock::{Clock, TokioClock};
use crate::resilience::backoff::retry_delay;

/// Floor for a single probe deadline once the budget is nearly spent.
const MIN_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(100);

/// Retry budget and pacing for one wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub backoff: BackoffKind,
    pub max_interval: Duration,
    pub timeout: Duration,
    pub max_attempts: Option<u32>,
    pub connect_timeout: Duration,
}

impl From<&WaitConfig> for WaitPolicy {
    fn from(config: &WaitConfig) -> Self {
        Self {
            interval: config.interval(),
            backoff: config.backoff,
            max_interval: config.max_interval(),
            timeout: config.timeout(),
            max_attempts: config.max_attempts,
            connect_timeout: config.connect_timeout(),
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::from(&WaitConfig::default())
    }
}

/// Result of a successful wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    /// Attempts made, including the successful one.
    pub attempts: u32,
    /// Time from the first attempt until readiness.
    pub elapsed: Duration,
}

/// Blocks until a target accepts connections.
pub struct Waiter<P, C = TokioClock> {
    probe: P,
    clock: C,
    policy: WaitPolicy,
}

impl<P: Probe, C: Clock> Waiter<P, C> {
    pub fn new(probe: P, clock: C, policy: WaitPolicy) -> Self {
        Self { probe, clock, policy }
    }

    pub fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    /// Wait for `target` to become ready.
    pub async fn wait_for(&self, target: &ConnectionTarget) -> Result<WaitOutcome, BootstrapError> {
        let policy = &self.policy;
        let started = self.clock.now();
        let mut attempts: u32 = 0;

        tracing::info!(
            target = %target,
            timeout_secs = policy.timeout.as_secs_f64(),
            max_attempts = ?policy.max_attempts,
            "Waiting for target"
        );

        loop {
            attempts += 1;

            let remaining = policy.timeout.saturating_sub(self.elapsed_since(started));
            let attempt_timeout = policy.connect_timeout.min(remaining.max(MIN_ATTEMPT_TIMEOUT));

            match self.probe.probe(target, attempt_timeout).await {
                Ok(()) => {
                    let elapsed = self.elapsed_since(started);
                    metrics::record_wait_attempt(target, true);
                    metrics::record_wait_duration(elapsed);
                    tracing::info!(
                        target = %target,
                        attempts,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Target is ready"
                    );
                    return Ok(WaitOutcome { attempts, elapsed });
                }
                Err(e) => {
                    metrics::record_wait_attempt(target, false);
                    tracing::debug!(
                        target = %target,
                        attempt = attempts,
                        error = %e,
                        "Target not ready"
                    );
                }
            }

            let elapsed = self.elapsed_since(started);
            let attempts_spent = policy.max_attempts.is_some_and(|max| attempts >= max);
            if attempts_spent || elapsed >= policy.timeout {
                tracing::error!(
                    target = %target,
                    attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Gave up waiting for target"
                );
                return Err(BootstrapError::Timeout {
                    target: target.clone(),
                    attempts,
                    elapsed,
                });
            }

            let delay = retry_delay(policy.backoff, attempts, policy.interval, policy.max_interval)
                .min(policy.timeout - elapsed);
            self.clock.sleep(delay).await;
        }
    }

    fn elapsed_since(&self, started: std::time::Instant) -> Duration {
        self.clock.now().saturating_duration_since(started)
    }
}

/// Wait for `target` with the configured probe on the real clock.
pub async fn wait_for_target(
    target: &ConnectionTarget,
    config: &WaitConfig,
) -> Result<WaitOutcome, BootstrapError> {
    let waiter = Waiter::new(TargetProbe::from(config.probe), TokioClock, WaitPolicy::from(config));
    waiter.wait_for(target).await
}
