//! Reachability targets.

use std::fmt;
use std::net::Ipv6Addr;

use crate::error::BootstrapError;

/// Characters a URL parser would read as structure rather than host.
const URL_DELIMITERS: &[char] = &['/', '\\', '@', '?', '#', '%', '[', ']', ':'];

/// A validated `(host, port)` pair.
///
/// Construction is the only validation point: an existing target always has a
/// well-formed host (a domain, an IPv4 address or an unbracketed IPv6
/// address) and a port in `1..=65535`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionTarget {
    host: String,
    port: u16,
}

impl ConnectionTarget {
    /// Build a target from an already-typed port.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, BootstrapError> {
        Self::build("--host", "--port", host.into(), port)
    }

    /// Parse a target from raw command-line values.
    ///
    /// `host_param` and `port_param` name the flags in error messages so the
    /// diagnostic points at the offending argument.
    pub fn parse(
        host_param: &str,
        host: Option<&str>,
        port_param: &str,
        port: Option<&str>,
    ) -> Result<Self, BootstrapError> {
        let host = require(host_param, host)?;
        let port = parse_port(port_param, port)?;
        Self::build(host_param, port_param, host.to_string(), port)
    }

    fn build(
        host_param: &str,
        port_param: &str,
        host: String,
        port: u16,
    ) -> Result<Self, BootstrapError> {
        let host = validate_host(host_param, host.trim())?;
        if port == 0 {
            return Err(BootstrapError::configuration(port_param, "port must be in 1..=65535"));
        }
        Ok(Self { host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Accept a domain, an IPv4 address, or an IPv6 address with or without
/// brackets. IPv6 hosts are stored in canonical form.
fn validate_host(param: &str, host: &str) -> Result<String, BootstrapError> {
    if host.is_empty() {
        return Err(BootstrapError::configuration(param, "must not be empty"));
    }

    let unbracketed = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if let Ok(addr) = unbracketed.parse::<Ipv6Addr>() {
        return Ok(addr.to_string());
    }

    let invalid = || BootstrapError::configuration(param, format!("invalid host {:?}", host));
    if host.chars().any(|c| c.is_whitespace() || URL_DELIMITERS.contains(&c)) {
        return Err(invalid());
    }
    url::Host::parse(host).map_err(|_| invalid())?;
    Ok(host.to_string())
}

/// Require a present, non-blank value.
pub(crate) fn require<'a>(param: &str, value: Option<&'a str>) -> Result<&'a str, BootstrapError> {
    match value.map(str::trim) {
        None => Err(BootstrapError::configuration(param, "is required")),
        Some("") => Err(BootstrapError::configuration(param, "must not be empty")),
        Some(v) => Ok(v),
    }
}

/// Parse a TCP port, rejecting non-numeric input and 0.
pub(crate) fn parse_port(param: &str, value: Option<&str>) -> Result<u16, BootstrapError> {
    let raw = require(param, value)?;
    match raw.parse::<u16>() {
        Ok(0) | Err(_) => Err(BootstrapError::configuration(
            param,
            format!("invalid port {:?}", raw),
        )),
        Ok(port) => Ok(port),
    }
}
