//! Request routing and forwarding.
//!
//! # Per-request flow
//! ```text
//! Received
//!     → next_peer()          ── Err ──→ 503 Service Unavailable
//!     → rewrite + forward    ── Err ──→ 502 Bad Gateway
//!     → relay status, headers, body
//! ```
//!
//! # Design Decisions
//! - Every request is balanced the same way regardless of method or path
//! - A failed upstream is not retried against another backend
//! - Response bodies are streamed, never buffered

use std::net::SocketAddr;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use url::Url;

use crate::http::forwarded;
use crate::http::server::AppState;
use crate::load_balancer::SelectError;

/// Caller-visible proxy failures.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No peer could be selected; nothing was sent upstream.
    #[error(transparent)]
    Unavailable(#[from] SelectError),

    /// The selected backend failed while handling the request.
    #[error("upstream {backend} failed: {source}")]
    Transport {
        backend: Url,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// The upstream request could not be built from the inbound one.
    #[error("invalid upstream request: {0}")]
    Request(#[from] axum::http::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Transport { .. } | ProxyError::Request(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = match self.status() {
            StatusCode::SERVICE_UNAVAILABLE => "Service unavailable",
            _ => "Bad Gateway",
        };
        (self.status(), body).into_response()
    }
}

/// Main proxy handler.
/// Selects a backend, rewrites the request, and relays the response.
pub async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let peer = match state.pool.next_peer() {
        Ok(peer) => peer,
        Err(reason) => {
            tracing::warn!(
                method = %method,
                path = %path,
                remote = %remote,
                reason = %reason,
                "No healthy peer available"
            );
            return Err(reason.into());
        }
    };

    tracing::info!(
        method = %method,
        path = %path,
        remote = %remote,
        backend = %peer.url(),
        "Routing request"
    );

    let upstream = forwarded::rewrite_request(request, peer.url(), remote).map_err(|e| {
        tracing::error!(
            method = %method,
            path = %path,
            remote = %remote,
            backend = %peer.url(),
            error = %e,
            "Failed to build upstream request"
        );
        ProxyError::Request(e)
    })?;

    match state.client.request(upstream).await {
        Ok(response) => {
            let (mut parts, body) = response.into_parts();
            forwarded::strip_hop_by_hop(&mut parts.headers);
            tracing::debug!(
                backend = %peer.url(),
                status = %parts.status,
                "Relaying upstream response"
            );
            Ok(Response::from_parts(parts, Body::new(body)))
        }
        Err(source) => {
            tracing::error!(
                method = %method,
                path = %path,
                remote = %remote,
                backend = %peer.url(),
                error = %source,
                "Proxy error"
            );
            Err(ProxyError::Transport {
                backend: peer.url().clone(),
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            ProxyError::from(SelectError::NoBackendsRegistered).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ProxyError::from(SelectError::NoHealthyBackend).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let bad_request = Request::builder().uri("http://[::1").body(()).unwrap_err();
        let err = ProxyError::from(bad_request);
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
