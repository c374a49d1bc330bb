//! Bootstrap error taxonomy.
//!
//! # Variants
//! - Timeout: the datastore never became reachable
//! - Configuration: a required parameter is missing or malformed
//! - Startup: the service could not bind or initialize
//!
//! Every variant is fatal. Binaries translate them to process exit codes
//! through [`BootstrapError::exit_code`].

use std::time::Duration;
use thiserror::Error;

use crate::net::ConnectionTarget;

/// Exit code for configuration errors (matches clap's usage error code).
pub const EXIT_CONFIGURATION: i32 = 2;
/// Exit code when the readiness wait times out.
pub const EXIT_TIMEOUT: i32 = 3;
/// Exit code when the service (or hand-off command) fails to start.
pub const EXIT_STARTUP: i32 = 4;

/// Errors that end the bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Target did not accept a connection within the wait budget.
    #[error("Timeout waiting for {target} after {attempts} attempt(s) in {:.1}s", .elapsed.as_secs_f64())]
    Timeout {
        target: ConnectionTarget,
        attempts: u32,
        elapsed: Duration,
    },

    /// A startup parameter is missing or malformed.
    #[error("Configuration error: {parameter}: {reason}")]
    Configuration { parameter: String, reason: String },

    /// The service process failed to bind or initialize.
    #[error("Startup error: {context}: {source}")]
    Startup {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl BootstrapError {
    pub fn configuration(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub fn startup(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Startup {
            context: context.into(),
            source,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::Timeout { .. } => EXIT_TIMEOUT,
            BootstrapError::Configuration { .. } => EXIT_CONFIGURATION,
            BootstrapError::Startup { .. } => EXIT_STARTUP,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BootstrapError::Timeout { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, BootstrapError::Configuration { .. })
    }

    pub fn is_startup(&self) -> bool {
        matches!(self, BootstrapError::Startup { .. })
    }
}
