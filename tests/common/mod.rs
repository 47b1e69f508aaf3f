//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use axum::{http::HeaderMap, response::IntoResponse, Router};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use url::Url;

use lb_proxy::config::ProxyConfig;
use lb_proxy::{BackendPool, HttpServer, Shutdown};

pub const SEEN_FORWARDED_FOR: &str = "x-seen-forwarded-for";
pub const SEEN_REAL_IP: &str = "x-seen-real-ip";
pub const SEEN_FORWARDED_HOST: &str = "x-seen-forwarded-host";
pub const SEEN_HOST: &str = "x-seen-host";

pub fn url_for(addr: SocketAddr) -> Url {
    format!("http://{}", addr).parse().unwrap()
}

/// Start a simple mock backend that returns a fixed response.
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start an axum backend that answers with `body` and echoes the forwarding
/// headers it received back as `x-seen-*` response headers.
pub async fn start_echo_backend(body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(move |headers: HeaderMap| async move {
        let echo = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        (
            [
                (SEEN_FORWARDED_FOR, echo("x-forwarded-for")),
                (SEEN_REAL_IP, echo("x-real-ip")),
                (SEEN_FORWARDED_HOST, echo("x-forwarded-host")),
                (SEEN_HOST, echo("host")),
            ],
            body,
        )
            .into_response()
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// Address of a port nothing listens on.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A listener whose accept backlog is full, so new connects hang.
/// Keep it alive for as long as the address should stay unresponsive.
pub struct HangingBackend {
    pub addr: SocketAddr,
    _listener: TcpListener,
    _held: Vec<TcpStream>,
}

pub async fn start_hanging_backend() -> HangingBackend {
    let socket = TcpSocket::new_v4().unwrap();
    socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let listener = socket.listen(0).unwrap();
    let addr = listener.local_addr().unwrap();

    let mut held = Vec::new();
    for _ in 0..64 {
        match tokio::time::timeout(Duration::from_millis(200), TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => held.push(stream),
            _ => break,
        }
    }

    HangingBackend {
        addr,
        _listener: listener,
        _held: held,
    }
}

/// Backend that accepts and counts connections, reads the request, then
/// closes the socket without answering.
pub async fn start_dropping_backend() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                drop(socket);
            });
        }
    });

    (addr, accepted)
}

/// Start the load balancer on an ephemeral port over `pool`.
pub async fn start_proxy(config: ProxyConfig, pool: Arc<BackendPool>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, pool);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Let the accept loop start
    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, shutdown)
}

/// Config for a proxy whose liveness the test drives directly.
pub fn test_config() -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
