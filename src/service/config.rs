//! Service startup parameters.
//!
//! # Responsibilities
//! - Accept the seven raw command-line values as given
//! - Validate presence and shape before anything binds or connects
//! - Name the offending flag in every error
//!
//! Raw values are `Option<String>` so a missing flag is reported by our own
//! validation (as a configuration error) rather than by the argument parser.

use std::fmt;

use clap::Args;

use crate::error::BootstrapError;
use crate::net::target::require;
use crate::net::ConnectionTarget;

/// Starter flags exactly as passed on the command line.
#[derive(Debug, Clone, Default, Args)]
pub struct RawStartupArgs {
    /// Hostname or IP to bind to
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short = 'p', long = "port")]
    pub port: Option<String>,

    /// Database name
    #[arg(short = 'd', long = "db-name")]
    pub db_name: Option<String>,

    /// Database user name
    #[arg(short = 'u', long = "db-user-name")]
    pub db_user_name: Option<String>,

    /// Database user password
    #[arg(long = "db-user-password")]
    pub db_user_password: Option<String>,

    /// Database location
    #[arg(long = "db-host")]
    pub db_host: Option<String>,

    /// Database port
    #[arg(long = "db-port")]
    pub db_port: Option<String>,
}

/// Validated startup parameters. Built once, never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceStartupConfig {
    bind: ConnectionTarget,
    db_name: String,
    db_user: String,
    db_password: String,
    db: ConnectionTarget,
}

impl ServiceStartupConfig {
    /// Validate raw flags in command-line order, stopping at the first problem.
    pub fn from_raw(raw: &RawStartupArgs) -> Result<Self, BootstrapError> {
        let bind = ConnectionTarget::parse("--host", raw.host.as_deref(), "--port", raw.port.as_deref())?;

        let db_name = require("--db-name", raw.db_name.as_deref())?;
        if db_name.contains(|c: char| c == '/' || c.is_whitespace()) {
            return Err(BootstrapError::configuration(
                "--db-name",
                format!("invalid database name {:?}", db_name),
            ));
        }
        let db_user = require("--db-user-name", raw.db_user_name.as_deref())?;
        let db_password = require_untrimmed("--db-user-password", raw.db_user_password.as_deref())?;

        let db = ConnectionTarget::parse(
            "--db-host",
            raw.db_host.as_deref(),
            "--db-port",
            raw.db_port.as_deref(),
        )?;

        Ok(Self {
            bind,
            db_name: db_name.to_string(),
            db_user: db_user.to_string(),
            db_password: db_password.to_string(),
            db,
        })
    }

    /// Where the service listens.
    pub fn bind_target(&self) -> &ConnectionTarget {
        &self.bind
    }

    /// Where the datastore is expected.
    pub fn db_target(&self) -> &ConnectionTarget {
        &self.db
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn db_user(&self) -> &str {
        &self.db_user
    }

    pub fn db_password(&self) -> &str {
        &self.db_password
    }
}

impl fmt::Debug for ServiceStartupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceStartupConfig")
            .field("bind", &self.bind)
            .field("db_name", &self.db_name)
            .field("db_user", &self.db_user)
            .field("db_password", &"***")
            .field("db", &self.db)
            .finish()
    }
}

// Passwords may legitimately start or end with spaces.
fn require_untrimmed<'a>(param: &str, value: Option<&'a str>) -> Result<&'a str, BootstrapError> {
    match value {
        None => Err(BootstrapError::configuration(param, "is required")),
        Some("") => Err(BootstrapError::configuration(param, "must not be empty")),
        Some(v) => Ok(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawStartupArgs {
        RawStartupArgs {
            host: Some("server".into()),
            port: Some("12345".into()),
            db_name: Some("messages".into()),
            db_user_name: Some("mdu".into()),
            db_user_password: Some("secret".into()),
            db_host: Some("db".into()),
            db_port: Some("3306".into()),
        }
    }

    #[test]
    fn test_valid_parameters() {
        let config = ServiceStartupConfig::from_raw(&raw()).unwrap();
        assert_eq!(config.bind_target().to_string(), "server:12345");
        assert_eq!(config.db_target().to_string(), "db:3306");
        assert_eq!(config.db_name(), "messages");
        assert_eq!(config.db_user(), "mdu");
        assert_eq!(config.db_password(), "secret");
    }

    #[test]
    fn test_every_parameter_is_required() {
        let cases: [(&str, fn(&mut RawStartupArgs)); 7] = [
            ("--host", |r| r.host = None),
            ("--port", |r| r.port = None),
            ("--db-name", |r| r.db_name = None),
            ("--db-user-name", |r| r.db_user_name = None),
            ("--db-user-password", |r| r.db_user_password = None),
            ("--db-host", |r| r.db_host = None),
            ("--db-port", |r| r.db_port = None),
        ];

        for (param, clear) in cases {
            let mut args = raw();
            clear(&mut args);
            match ServiceStartupConfig::from_raw(&args) {
                Err(BootstrapError::Configuration { parameter, .. }) => assert_eq!(parameter, param),
                other => panic!("{param}: expected configuration error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_user_is_rejected() {
        let mut args = raw();
        args.db_user_name = Some(String::new());

        let err = ServiceStartupConfig::from_raw(&args).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: --db-user-name: must not be empty");
    }

    #[test]
    fn test_non_numeric_ports_are_rejected() {
        let mut args = raw();
        args.db_port = Some("mysql".into());
        assert!(ServiceStartupConfig::from_raw(&args).unwrap_err().is_configuration());

        let mut args = raw();
        args.port = Some("12345x".into());
        assert!(ServiceStartupConfig::from_raw(&args).unwrap_err().is_configuration());
    }

    #[test]
    fn test_password_is_kept_verbatim_and_redacted() {
        let mut args = raw();
        args.db_user_password = Some(" p@ss word ".into());

        let config = ServiceStartupConfig::from_raw(&args).unwrap();
        assert_eq!(config.db_password(), " p@ss word ");
        assert!(!format!("{:?}", config).contains("p@ss"));
    }

    #[test]
    fn test_db_host_that_would_rewrite_the_url_is_rejected() {
        for host in ["db/x", "evil@db", "db?x", "db#x"] {
            let mut args = raw();
            args.db_host = Some(host.into());
            args.db_port = Some("33306".into());

            match ServiceStartupConfig::from_raw(&args) {
                Err(BootstrapError::Configuration { parameter, .. }) => assert_eq!(parameter, "--db-host"),
                other => panic!("{host}: expected configuration error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_db_name_with_slash_is_rejected() {
        let mut args = raw();
        args.db_name = Some("a/b".into());
        assert!(ServiceStartupConfig::from_raw(&args).unwrap_err().is_configuration());
    }
}
