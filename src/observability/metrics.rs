//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bootstrap_wait_attempts_total` (counter): probe attempts by target, outcome
//! - `bootstrap_wait_duration_seconds` (histogram): time until the target was ready
//! - `bootstrap_state` (gauge): current bootstrap state code
//!
//! Recording is a no-op until a recorder is installed, so library callers and
//! tests pay nothing when the exporter is disabled.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::lifecycle::state::BootstrapState;
use crate::net::ConnectionTarget;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime. Failure is logged, not fatal.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_wait_attempt(target: &ConnectionTarget, ready: bool) {
    let outcome = if ready { "ready" } else { "not_ready" };
    metrics::counter!(
        "bootstrap_wait_attempts_total",
        "target" => target.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_wait_duration(elapsed: Duration) {
    metrics::histogram!("bootstrap_wait_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_state(state: BootstrapState) {
    metrics::gauge!("bootstrap_state").set(state.code() as f64);
}
