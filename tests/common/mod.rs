//! Shared utilities for integration tests.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use server_bootstrap::net::{ConnectionTarget, Probe};
use server_bootstrap::service::RawStartupArgs;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// Reserve a free local port. The port is released before returning.
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Starter flags for a service on `127.0.0.1:bind_port` and a db on `127.0.0.1:db_port`.
pub fn startup_args(bind_port: u16, db_port: u16) -> RawStartupArgs {
    RawStartupArgs {
        host: Some("127.0.0.1".into()),
        port: Some(bind_port.to_string()),
        db_name: Some("messages".into()),
        db_user_name: Some("mdu".into()),
        db_user_password: Some("secret".into()),
        db_host: Some("127.0.0.1".into()),
        db_port: Some(db_port.to_string()),
    }
}

/// Refuses a fixed number of times, then reports ready.
pub struct ScriptedProbe {
    failures: AtomicU32,
    calls: AtomicU32,
}

impl ScriptedProbe {
    pub fn failing(times: u32) -> Self {
        Self {
            failures: AtomicU32::new(times),
            calls: AtomicU32::new(0),
        }
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Probe for &ScriptedProbe {
    async fn probe(&self, _target: &ConnectionTarget, _timeout: Duration) -> io::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(io::Error::from(io::ErrorKind::ConnectionRefused));
        }
        Ok(())
    }
}

/// Start a fake MySQL server that sends a protocol v10 greeting to every client.
#[allow(dead_code)]
pub async fn start_mysql_greeter(addr: SocketAddr) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut payload = vec![0x0a];
                        payload.extend_from_slice(b"8.0.36\0");
                        payload.extend_from_slice(&[7, 0, 0, 0]);
                        let mut packet = (payload.len() as u32).to_le_bytes()[..3].to_vec();
                        packet.push(0);
                        packet.extend_from_slice(&payload);
                        let _ = socket.write_all(&packet).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Whether anything accepts connections on `127.0.0.1:port`.
#[allow(dead_code)]
pub async fn is_listening(port: u16) -> bool {
    tokio::net::TcpStream::connect(("127.0.0.1", port)).await.is_ok()
}

/// HTTP client that ignores proxy settings from the environment.
#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
