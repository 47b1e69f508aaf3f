//! Toy backend for trying the load balancer by hand.
//!
//! `echo-backend 9001 "hello"` answers every request with the port, the
//! message and the request path.

use std::net::SocketAddr;
use axum::{extract::ConnectInfo, http::Uri, Router};
use clap::Parser;

#[derive(Parser)]
#[command(name = "echo-backend")]
#[command(about = "HTTP server that echoes a fixed message and the request path", long_about = None)]
struct Cli {
    /// Port to listen on.
    port: u16,

    /// Message included in every response.
    message: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "echo_backend=info".into()),
        )
        .init();

    let Cli { port, message } = Cli::parse();

    let app = Router::new().fallback(move |ConnectInfo(remote): ConnectInfo<SocketAddr>, uri: Uri| {
        let message = message.clone();
        async move {
            tracing::info!(port, path = %uri.path(), remote = %remote, "Backend received request");
            format!(
                "Message from backend on port {}: {}\nPath: {}\n",
                port,
                message,
                uri.path()
            )
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Echo backend listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
