//! Command-line surface of the three binaries.
//!
//! ```text
//! wait-for-db       --host --port [policy flags] [-c '<command>']
//! starter           --host --port --db-name --db-user-name --db-user-password --db-host --db-port
//! server-bootstrap  starter flags + policy flags
//! ```
//!
//! Connection values are taken as raw strings and validated by the library so
//! that every malformed value surfaces as a configuration error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser};

use crate::config::{load_or_default, validation::validate_config, BackoffKind, BootstrapConfig, ConfigError, ProbeKind, WaitConfig};
use crate::error::BootstrapError;
use crate::service::RawStartupArgs;

/// Exit code used when a signal interrupts the bootstrap.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Optional configuration file.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// TOML file with wait, server and observability settings
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Readiness policy overrides.
#[derive(Debug, Clone, Default, Args)]
pub struct WaitArgs {
    /// Maximum total wait in seconds
    #[arg(short = 't', long = "timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Delay between attempts in milliseconds
    #[arg(long = "interval", value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Upper bound on a single delay in milliseconds
    #[arg(long = "max-interval", value_name = "MS")]
    pub max_interval_ms: Option<u64>,

    /// Give up after this many attempts
    #[arg(long = "max-attempts", value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Deadline for a single attempt in milliseconds
    #[arg(long = "connect-timeout", value_name = "MS")]
    pub connect_timeout_ms: Option<u64>,

    /// Retry pacing
    #[arg(long = "backoff", value_enum)]
    pub backoff: Option<BackoffKind>,

    /// Readiness probe
    #[arg(long = "probe", value_enum)]
    pub probe: Option<ProbeKind>,
}

impl WaitArgs {
    /// Overwrite config values with any flags given.
    pub fn apply(&self, wait: &mut WaitConfig) {
        if let Some(v) = self.timeout_secs {
            wait.timeout_secs = v;
        }
        if let Some(v) = self.interval_ms {
            wait.interval_ms = v;
            // A bare --interval above the configured cap raises the cap too.
            if self.max_interval_ms.is_none() && wait.max_interval_ms < v {
                wait.max_interval_ms = v;
            }
        }
        if let Some(v) = self.max_interval_ms {
            wait.max_interval_ms = v;
        }
        if let Some(v) = self.max_attempts {
            wait.max_attempts = Some(v);
        }
        if let Some(v) = self.connect_timeout_ms {
            wait.connect_timeout_ms = v;
        }
        if let Some(v) = self.backoff {
            wait.backoff = v;
        }
        if let Some(v) = self.probe {
            wait.probe = v;
        }
    }
}

/// `wait-for-db`: block until a host/port is reachable, then optionally exec.
#[derive(Debug, Parser)]
#[command(name = "wait-for-db")]
#[command(about = "Wait until a database accepts connections", long_about = None)]
pub struct WaitForDbCli {
    /// Database host
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Database port
    #[arg(long = "port")]
    pub port: Option<String>,

    /// Command to exec once the database is reachable
    #[arg(short = 'c', long = "command")]
    pub command: Option<String>,

    #[command(flatten)]
    pub wait: WaitArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// `starter`: validate parameters and launch the service.
#[derive(Debug, Parser)]
#[command(name = "starter")]
#[command(about = "Start the server with explicit database parameters", long_about = None)]
pub struct StarterCli {
    #[command(flatten)]
    pub startup: RawStartupArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// `server-bootstrap`: wait for the database, then start, in one process.
#[derive(Debug, Parser)]
#[command(name = "server-bootstrap")]
#[command(about = "Wait for the database, then start the server", long_about = None)]
pub struct BootstrapCli {
    #[command(flatten)]
    pub startup: RawStartupArgs,

    #[command(flatten)]
    pub wait: WaitArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Load the config file (if any), apply flag overrides, validate the result.
pub fn resolve_config(config: &ConfigArgs, wait: Option<&WaitArgs>) -> Result<BootstrapConfig, BootstrapError> {
    let mut resolved = load_or_default(config.config.as_deref())?;
    if let Some(wait) = wait {
        wait.apply(&mut resolved.wait);
    }
    validate_config(&resolved).map_err(ConfigError::Validation)?;
    Ok(resolved)
}

/// Log and print a fatal error, and map it to the process exit code.
pub fn report(err: &BootstrapError) -> ExitCode {
    tracing::error!(error = %err, "Bootstrap aborted");
    eprintln!("error: {}", err);
    ExitCode::from(err.exit_code() as u8)
}
