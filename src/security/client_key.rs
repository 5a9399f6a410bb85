//! Client identity derivation.
//!
//! Keys are never stored on their own; they only index the counter stores.

use std::net::SocketAddr;

use axum::{extract::ConnectInfo, http::Request};

const UNKNOWN: &str = "unknown";

/// Client IP: the first configured header that yields a value, then the peer
/// address, then `"unknown"`.
///
/// Comma separated headers (`x-forwarded-for`) contribute their first entry.
pub fn client_ip<B>(request: &Request<B>, ip_headers: &[String]) -> String {
    for name in ip_headers {
        let value = request
            .headers()
            .get(name.as_str())
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = value {
            return ip.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// User-Agent header or `"unknown"`.
pub fn user_agent<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Login throttle identity: `ip|user-agent`.
pub fn fingerprint(ip: &str, user_agent: &str) -> String {
    format!("{}|{}", ip, user_agent)
}

/// Generic limiter key: `ip:prefix` when a strict prefix matched, else `ip`.
pub fn rate_limit_key(ip: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", ip, prefix),
        None => ip.to_string(),
    }
}
