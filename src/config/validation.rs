//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals and timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BootstrapConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::BootstrapConfig;

/// A single invalid field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check every field and collect all problems.
pub fn validate_config(config: &BootstrapConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let wait = &config.wait;

    if wait.interval_ms == 0 {
        errors.push(ValidationError::new("wait.interval_ms", "must be greater than 0"));
    }
    if wait.max_interval_ms < wait.interval_ms {
        errors.push(ValidationError::new(
            "wait.max_interval_ms",
            format!("must be at least interval_ms ({})", wait.interval_ms),
        ));
    }
    if wait.timeout_secs == 0 {
        errors.push(ValidationError::new("wait.timeout_secs", "must be greater than 0"));
    }
    if wait.max_attempts == Some(0) {
        errors.push(ValidationError::new("wait.max_attempts", "must be at least 1"));
    }
    if wait.connect_timeout_ms == 0 {
        errors.push(ValidationError::new("wait.connect_timeout_ms", "must be greater than 0"));
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "server.request_timeout_secs",
            "must be greater than 0",
        ));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address {:?}", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
