//! Reachability probes.
//!
//! # Responsibilities
//! - Decide whether a target is accepting connections right now
//! - Bound every attempt with a deadline
//!
//! # Probes
//! - `TcpProbe`: a TCP connect succeeds
//! - `MysqlProbe`: TCP connect plus a valid MySQL server greeting
//!
//! A probe makes one attempt. Retrying belongs to the waiter.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time;

use crate::config::ProbeKind;
use crate::net::ConnectionTarget;

/// Largest greeting payload accepted from a server.
const MAX_GREETING_LEN: usize = 64 * 1024;

/// Handshake protocol version sent by MySQL 3.21 and later.
const PROTOCOL_V10: u8 = 0x0a;

/// First payload byte of a MySQL error packet.
const ERR_PACKET: u8 = 0xff;

/// A single reachability check against a target.
pub trait Probe {
    /// Attempt once. `Ok(())` means the target is ready.
    fn probe(
        &self,
        target: &ConnectionTarget,
        timeout: Duration,
    ) -> impl Future<Output = io::Result<()>> + Send;
}

/// Ready when a TCP connection can be established.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

impl Probe for TcpProbe {
    async fn probe(&self, target: &ConnectionTarget, timeout: Duration) -> io::Result<()> {
        let stream = connect(target, timeout).await?;
        drop(stream);
        Ok(())
    }
}

/// Ready when the server sends a protocol v10 greeting.
///
/// A listening socket alone does not mean the server can take clients; an
/// error packet such as "Too many connections" is reported as not ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlProbe;

impl Probe for MysqlProbe {
    async fn probe(&self, target: &ConnectionTarget, timeout: Duration) -> io::Result<()> {
        let attempt = async {
            let mut stream = connect(target, timeout).await?;
            let payload = read_packet(&mut stream).await?;
            let version = parse_greeting(&payload)?;
            tracing::debug!(target = %target, server_version = %version, "MySQL greeting received");
            Ok(())
        };

        match time::timeout(timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "greeting timed out")),
        }
    }
}

/// Probe selected at runtime from configuration.
#[derive(Debug, Clone, Copy)]
pub enum TargetProbe {
    Tcp(TcpProbe),
    Mysql(MysqlProbe),
}

impl From<ProbeKind> for TargetProbe {
    fn from(kind: ProbeKind) -> Self {
        match kind {
            ProbeKind::Tcp => TargetProbe::Tcp(TcpProbe),
            ProbeKind::Mysql => TargetProbe::Mysql(MysqlProbe),
        }
    }
}

impl Probe for TargetProbe {
    async fn probe(&self, target: &ConnectionTarget, timeout: Duration) -> io::Result<()> {
        match self {
            TargetProbe::Tcp(p) => p.probe(target, timeout).await,
            TargetProbe::Mysql(p) => p.probe(target, timeout).await,
        }
    }
}

async fn connect(target: &ConnectionTarget, timeout: Duration) -> io::Result<TcpStream> {
    match time::timeout(timeout, TcpStream::connect((target.host(), target.port()))).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")),
    }
}

/// Read one MySQL packet: 3-byte little-endian length, sequence id, payload.
async fn read_packet(stream: &mut TcpStream) -> io::Result<Vec<u8>> {
    let mut header = [0u8; 4];
    stream.read_exact(&mut header).await?;

    let len = u32::from_le_bytes([header[0], header[1], header[2], 0]) as usize;
    if len == 0 || len > MAX_GREETING_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unexpected greeting length {}", len),
        ));
    }

    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Validate a greeting payload and return the server version string.
pub fn parse_greeting(payload: &[u8]) -> io::Result<String> {
    match payload.first() {
        Some(&PROTOCOL_V10) => {
            let rest = &payload[1..];
            let end = rest.iter().position(|b| *b == 0).unwrap_or(rest.len());
            Ok(String::from_utf8_lossy(&rest[..end]).into_owned())
        }
        Some(&ERR_PACKET) => Err(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            parse_error_packet(payload),
        )),
        Some(other) => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported protocol version {:#04x}", other),
        )),
        None => Err(io::Error::new(io::ErrorKind::InvalidData, "empty greeting")),
    }
}

fn parse_error_packet(payload: &[u8]) -> String {
    if payload.len() < 3 {
        return "server error (truncated packet)".to_string();
    }
    let code = u16::from_le_bytes([payload[1], payload[2]]);
    let mut message = &payload[3..];
    // Optional SQL state: '#' followed by five characters.
    if message.first() == Some(&b'#') && message.len() >= 6 {
        message = &message[6..];
    }
    format!("server error {}: {}", code, String::from_utf8_lossy(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    fn greeting(version: &str) -> Vec<u8> {
        let mut payload = vec![PROTOCOL_V10];
        payload.extend_from_slice(version.as_bytes());
        payload.push(0);
        // thread id + auth data, content is irrelevant to the probe
        payload.extend_from_slice(&[1, 0, 0, 0, b'a', b'b', b'c', b'd', b'e', b'f', b'g', b'h', 0]);
        payload
    }

    fn frame(payload: &[u8]) -> Vec<u8> {
        let len = payload.len() as u32;
        let mut packet = len.to_le_bytes()[..3].to_vec();
        packet.push(0);
        packet.extend_from_slice(payload);
        packet
    }

    #[test]
    fn test_parse_v10_greeting() {
        let version = parse_greeting(&greeting("8.0.36")).unwrap();
        assert_eq!(version, "8.0.36");
    }

    #[test]
    fn test_parse_error_packet() {
        let mut payload = vec![ERR_PACKET];
        payload.extend_from_slice(&1040u16.to_le_bytes());
        payload.extend_from_slice(b"Too many connections");

        let err = parse_greeting(&payload).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
        assert_eq!(err.to_string(), "server error 1040: Too many connections");
    }

    #[test]
    fn test_parse_error_packet_with_sql_state() {
        let mut payload = vec![ERR_PACKET];
        payload.extend_from_slice(&1045u16.to_le_bytes());
        payload.extend_from_slice(b"#28000Access denied");

        let err = parse_greeting(&payload).unwrap_err();
        assert_eq!(err.to_string(), "server error 1045: Access denied");
    }

    #[test]
    fn test_rejects_unknown_protocol() {
        assert_eq!(parse_greeting(&[0x09, b'x']).unwrap_err().kind(), io::ErrorKind::InvalidData);
        assert_eq!(parse_greeting(&[]).unwrap_err().kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_tcp_probe_against_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let target = ConnectionTarget::new("127.0.0.1", port).unwrap();

        TcpProbe.probe(&target, Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_tcp_probe_refused() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let target = ConnectionTarget::new("127.0.0.1", port).unwrap();

        assert!(TcpProbe.probe(&target, Duration::from_secs(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_mysql_probe_reads_greeting() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(&frame(&greeting("8.0.36"))).await.unwrap();
        });

        let target = ConnectionTarget::new("127.0.0.1", port).unwrap();
        MysqlProbe.probe(&target, Duration::from_secs(2)).await.unwrap();
    }

    /// Serve one connection that writes `bytes` and then holds the socket open.
    async fn serve_once(bytes: Vec<u8>) -> ConnectionTarget {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(&bytes).await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        ConnectionTarget::new("127.0.0.1", port).unwrap()
    }

    #[tokio::test]
    async fn test_mysql_probe_rejects_empty_packet() {
        let target = serve_once(vec![0, 0, 0, 0]).await;

        let err = MysqlProbe.probe(&target, Duration::from_secs(2)).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(err.to_string(), "unexpected greeting length 0");
    }

    #[tokio::test]
    async fn test_mysql_probe_rejects_oversized_packet() {
        // 0x010001 = 65537 bytes, one past the limit.
        let target = serve_once(vec![0x01, 0x00, 0x01, 0]).await;

        let err = MysqlProbe.probe(&target, Duration::from_secs(2)).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(err.to_string(), "unexpected greeting length 65537");
    }

    #[tokio::test]
    async fn test_mysql_probe_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let target = ConnectionTarget::new("127.0.0.1", port).unwrap();
        let err = MysqlProbe.probe(&target, Duration::from_millis(200)).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}
