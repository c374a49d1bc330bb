//! Service listener binding.
//!
//! # Responsibilities
//! - Resolve the configured bind host
//! - Bind with `SO_REUSEADDR` so a restarted container can rebind at once
//! - Report every failure as a startup error naming the address

use std::io;
use std::net::SocketAddr;

use tokio::net::{lookup_host, TcpListener, TcpSocket};

use crate::error::BootstrapError;
use crate::net::ConnectionTarget;

/// Listen backlog for the service socket.
const BACKLOG: u32 = 1024;

/// Bind a TCP listener for the service at `target`.
pub async fn bind(target: &ConnectionTarget) -> Result<TcpListener, BootstrapError> {
    let context = || format!("bind {}", target);

    let addr: SocketAddr = lookup_host((target.host(), target.port()))
        .await
        .map_err(|e| BootstrapError::startup(context(), e))?
        .next()
        .ok_or_else(|| {
            BootstrapError::startup(
                context(),
                io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses"),
            )
        })?;

    let listener = bind_addr(addr).map_err(|e| BootstrapError::startup(context(), e))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| BootstrapError::startup(context(), e))?;

    tracing::info!(
        address = %local_addr,
        "Listener bound"
    );

    Ok(listener)
}

fn bind_addr(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(BACKLOG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        let target = ConnectionTarget::new("127.0.0.1", port).unwrap();
        let listener = bind(&target).await.unwrap();
        assert_eq!(listener.local_addr().unwrap().port(), port);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_startup_error() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let target = ConnectionTarget::new("127.0.0.1", port).unwrap();
        let err = bind(&target).await.unwrap_err();
        assert!(err.is_startup());
        assert!(err.to_string().contains(&format!("bind 127.0.0.1:{}", port)));
    }
}
