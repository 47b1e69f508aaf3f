//! TCP reachability probe.
//!
//! A backend counts as reachable if a TCP connection to its host and port
//! completes within the timeout. No bytes are exchanged.

use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time;
use url::Url;

/// Why a backend was judged unreachable.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("backend address {0} has no host")]
    MissingHost(Url),

    #[error("backend address {0} has no port and no known default for its scheme")]
    MissingPort(Url),

    #[error("connect to {target} timed out after {timeout:?}")]
    Timeout { target: String, timeout: Duration },

    #[error("connect to {target} failed: {source}")]
    Connect {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

/// Attempt a TCP connect to the backend, bounded by `timeout`.
pub async fn tcp_probe(url: &Url, timeout: Duration) -> Result<(), ProbeError> {
    let host = url
        .host_str()
        .ok_or_else(|| ProbeError::MissingHost(url.clone()))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| ProbeError::MissingPort(url.clone()))?;

    // IPv6 literals come back bracketed from host_str
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let target = format!("{}:{}", host, port);

    match time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(source)) => Err(ProbeError::Connect { target, source }),
        Err(_) => Err(ProbeError::Timeout { target, timeout }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::net::{TcpListener, TcpSocket};

    /// Listener with a full accept backlog: further connects hang until
    /// the caller's timeout. Connections are held until accepted or dropped.
    pub(crate) async fn saturated_listener() -> (TcpListener, Vec<TcpStream>) {
        let socket = TcpSocket::new_v4().unwrap();
        socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let listener = socket.listen(0).unwrap();
        let addr = listener.local_addr().unwrap();

        let mut held = Vec::new();
        for _ in 0..64 {
            match time::timeout(Duration::from_millis(200), TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => held.push(stream),
                _ => break,
            }
        }
        (listener, held)
    }

    #[tokio::test]
    async fn test_probe_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let url: Url = format!("http://{}", addr).parse().unwrap();

        assert!(tcp_probe(&url, Duration::from_secs(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_probe_refused_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url: Url = format!("http://{}", addr).parse().unwrap();

        let err = tcp_probe(&url, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ProbeError::Connect { .. }), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_full_backlog_times_out() {
        let (listener, _held) = saturated_listener().await;
        let url: Url = format!("http://{}", listener.local_addr().unwrap()).parse().unwrap();

        let started = std::time::Instant::now();
        let err = tcp_probe(&url, Duration::from_millis(300)).await.unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { .. }), "got {:?}", err);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_probe_ipv6_literal() {
        let Ok(listener) = TcpListener::bind("[::1]:0").await else {
            // host without IPv6 loopback
            return;
        };
        let addr = listener.local_addr().unwrap();
        let url: Url = format!("http://[::1]:{}", addr.port()).parse().unwrap();

        assert!(tcp_probe(&url, Duration::from_secs(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_probe_without_host() {
        let url: Url = "mailto:ops@example.com".parse().unwrap();
        let err = tcp_probe(&url, Duration::from_millis(100)).await.unwrap_err();
        assert!(matches!(err, ProbeError::MissingHost(_)));
    }
}
