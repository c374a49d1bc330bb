//! Database connection URL.
//!
//! Accepted shape: `mysql[+driver]://[user[:password]@]host[:port]/name`.
//! The port defaults to 3306 when absent. `Display` never shows the password.

use std::fmt;
use std::net::Ipv6Addr;

use url::{Host, Url};

use crate::error::BootstrapError;
use crate::service::config::ServiceStartupConfig;

/// Default MySQL port.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

const SCHEME: &str = "mysql";

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseUrl {
    url: Url,
}

impl DatabaseUrl {
    /// Parse and validate a URL string.
    pub fn parse(input: &str) -> Result<Self, BootstrapError> {
        let invalid = |reason: String| BootstrapError::configuration("database url", reason);

        let url = Url::parse(input).map_err(|e| invalid(format!("{}: {:?}", e, redact_input(input))))?;

        let scheme = url.scheme();
        let known = scheme == SCHEME
            || scheme
                .strip_prefix("mysql+")
                .is_some_and(|driver| !driver.is_empty());
        if !known {
            return Err(invalid(format!("unsupported scheme {:?}", scheme)));
        }

        match url.host_str() {
            Some(host) if !host.is_empty() => {}
            _ => return Err(invalid("missing host".to_string())),
        }

        let name = url.path().trim_start_matches('/');
        if name.is_empty() || name.contains('/') {
            return Err(invalid(format!("invalid database name {:?}", name)));
        }

        Ok(Self { url })
    }

    /// Build the URL for a validated startup configuration.
    pub fn from_config(config: &ServiceStartupConfig) -> Result<Self, BootstrapError> {
        let db = config.db_target();
        let host = if db.host().contains(':') {
            format!("[{}]", db.host())
        } else {
            db.host().to_string()
        };

        let mut url = Url::parse(&format!("{}://{}:{}/", SCHEME, host, db.port()))
            .map_err(|e| BootstrapError::configuration("--db-host", format!("{}: {:?}", e, db.host())))?;

        url.set_path(&format!("/{}", config.db_name()));
        url.set_username(config.db_user())
            .map_err(|_| BootstrapError::configuration("--db-user-name", "cannot be used in a URL"))?;
        url.set_password(Some(config.db_password()))
            .map_err(|_| BootstrapError::configuration("--db-user-password", "cannot be used in a URL"))?;

        let built = Self::parse(url.as_str())?;

        // The URL must name exactly the target the waiter polled.
        let host_matches = match (built.url.host(), db.host().parse::<Ipv6Addr>()) {
            (Some(Host::Ipv6(actual)), Ok(expected)) => actual == expected,
            (Some(Host::Domain(actual)), Err(_)) => actual == db.host(),
            (Some(Host::Ipv4(actual)), Err(_)) => actual.to_string() == db.host(),
            _ => false,
        };
        if !host_matches {
            return Err(BootstrapError::configuration(
                "--db-host",
                format!("{:?} does not survive URL encoding", db.host()),
            ));
        }
        if built.url.port() != Some(db.port()) {
            return Err(BootstrapError::configuration(
                "--db-port",
                format!("{} does not survive URL encoding", db.port()),
            ));
        }

        Ok(built)
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> u16 {
        self.url.port().unwrap_or(DEFAULT_MYSQL_PORT)
    }

    pub fn database(&self) -> &str {
        self.url.path().trim_start_matches('/')
    }

    /// Percent-encoded user name, if any.
    pub fn username(&self) -> Option<&str> {
        Some(self.url.username()).filter(|u| !u.is_empty())
    }

    pub fn has_password(&self) -> bool {
        self.url.password().is_some()
    }

    /// Full URL including credentials. Do not log.
    pub fn expose(&self) -> &str {
        self.url.as_str()
    }

    /// URL with the password replaced by `***`.
    pub fn redacted(&self) -> String {
        let mut url = self.url.clone();
        if url.password().is_some() {
            let _ = url.set_password(Some("***"));
        }
        url.to_string()
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DatabaseUrl").field(&self.redacted()).finish()
    }
}

// Keep credentials out of parse error messages.
fn redact_input(input: &str) -> String {
    match (input.find("://"), input.rfind('@')) {
        (Some(start), Some(at)) if at > start => format!("{}://***{}", &input[..start], &input[at..]),
        _ => input.to_string(),
    }
}
