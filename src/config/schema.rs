//! Configuration schema definitions.
//!
//! This module defines the tunables shared by the bootstrap binaries.
//! All types derive Serde traits for deserialization from config files.
//! Startup parameters (hosts, ports, credentials) are never read from here;
//! they always come from the command line.

use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Root configuration for the bootstrap binaries.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Readiness wait policy.
    pub wait: WaitConfig,

    /// Started service settings.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// How to pace retries between probe attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// Sleep `interval` between every attempt.
    #[default]
    Fixed,
    /// Double the sleep after each failure, capped at `max_interval`.
    Exponential,
}

/// What counts as "reachable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// TCP connect succeeds.
    #[default]
    Tcp,
    /// TCP connect succeeds and the server sends a MySQL greeting.
    Mysql,
}

/// Readiness wait configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Delay between attempts in milliseconds (base delay for exponential).
    pub interval_ms: u64,

    /// Retry pacing.
    pub backoff: BackoffKind,

    /// Upper bound on a single delay in milliseconds.
    pub max_interval_ms: u64,

    /// Maximum total wait in seconds.
    pub timeout_secs: u64,

    /// Optional cap on the number of attempts.
    pub max_attempts: Option<u32>,

    /// Deadline for a single probe in milliseconds.
    pub connect_timeout_ms: u64,

    /// Probe used for each attempt.
    pub probe: ProbeKind,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            backoff: BackoffKind::Fixed,
            max_interval_ms: 10_000,
            timeout_secs: 60,
            max_attempts: None,
            connect_timeout_ms: 2000,
            probe: ProbeKind::Tcp,
        }
    }
}

impl WaitConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Started service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "server_bootstrap=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9100".to_string(),
        }
    }
}
