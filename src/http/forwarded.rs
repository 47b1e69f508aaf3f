//! Outgoing request rewriting.
//!
//! # Responsibilities
//! - Point the request URI at the selected backend
//! - Replace `Host`, set `X-Real-IP` and `X-Forwarded-Host`
//! - Append the client to `X-Forwarded-For`
//! - Strip hop-by-hop headers in both directions

use std::net::SocketAddr;
use axum::http::{
    header::{self, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue},
    request::Parts,
    Request, Uri, Version,
};
use url::Url;

pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// `host[:port]` of the backend, as used in the URI authority and `Host` header.
pub fn upstream_authority(target: &Url) -> String {
    let host = target.host_str().unwrap_or_default();
    match target.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Rewrite an inbound request so it can be sent to `target`.
pub fn rewrite_request<B>(
    request: Request<B>,
    target: &Url,
    remote: SocketAddr,
) -> Result<Request<B>, axum::http::Error> {
    let (mut parts, body) = request.into_parts();
    let original_host = original_host(&parts);

    let authority = upstream_authority(target);
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    parts.uri = Uri::builder()
        .scheme(target.scheme())
        .authority(authority.as_str())
        .path_and_query(path_and_query)
        .build()?;
    // Upstream connections are plain HTTP/1.1 regardless of the inbound protocol
    parts.version = Version::HTTP_11;

    strip_hop_by_hop(&mut parts.headers);

    let client_ip = remote.ip().to_string();
    let forwarded_for = append_forwarded_for(&parts.headers, &client_ip)?;

    let headers = &mut parts.headers;
    headers.insert(header::HOST, HeaderValue::from_str(&authority)?);
    headers.insert(X_REAL_IP, HeaderValue::from_str(&client_ip)?);
    headers.insert(X_FORWARDED_FOR, forwarded_for);
    match original_host {
        Some(host) => {
            headers.insert(X_FORWARDED_HOST, host);
        }
        None => {
            headers.remove(X_FORWARDED_HOST);
        }
    }

    Ok(Request::from_parts(parts, body))
}

/// Existing `X-Forwarded-For` chain with `client_ip` appended.
///
/// Works on raw bytes so entries that are not visible ASCII pass through unchanged.
pub fn append_forwarded_for(
    headers: &HeaderMap,
    client_ip: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut chain: Vec<&[u8]> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .map(|v| v.as_bytes().trim_ascii())
        .filter(|v| !v.is_empty())
        .collect();
    chain.push(client_ip.as_bytes());
    HeaderValue::from_bytes(&chain.join(&b", "[..]))
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

// HTTP/2 clients send :authority instead of Host.
fn original_host(parts: &Parts) -> Option<HeaderValue> {
    parts.headers.get(header::HOST).cloned().or_else(|| {
        parts
            .uri
            .authority()
            .and_then(|a| HeaderValue::from_str(a.as_str()).ok())
    })
}
