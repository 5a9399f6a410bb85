//! Upstream forwarding for paths the gate does not answer itself.
//!
//! # Design Decisions
//! - Method, path, query, headers and body are passed through unchanged
//! - Hop-by-hop headers are stripped in both directions
//! - No upstream configured means the gate is the whole site: 404

use std::str::FromStr;

use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        uri::{Authority, InvalidUri, PathAndQuery, Scheme},
        HeaderMap, HeaderValue, Request, StatusCode, Uri,
    },
    response::Response,
};
use thiserror::Error;

use crate::http::request::request_id;
use crate::http::response::json_error;
use crate::http::server::AppState;

const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "upgrade",
];

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream URL: {0}")]
    InvalidUri(#[from] InvalidUri),

    #[error("upstream URL has no host")]
    MissingHost,
}

/// Parsed upstream origin.
#[derive(Debug, Clone)]
pub struct Upstream {
    scheme: Scheme,
    authority: Authority,
}

impl Upstream {
    pub fn parse(url: &str) -> Result<Self, UpstreamError> {
        let parts = Uri::from_str(url)?.into_parts();
        let authority = parts.authority.ok_or(UpstreamError::MissingHost)?;
        Ok(Self {
            scheme: parts.scheme.unwrap_or(Scheme::HTTP),
            authority,
        })
    }

    /// Same path and query on the upstream origin.
    pub fn rewrite(&self, uri: &Uri) -> Result<Uri, axum::http::Error> {
        let path_and_query = uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

pub async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let Some(upstream) = state.upstream.as_ref() else {
        return json_error(StatusCode::NOT_FOUND, "Not found");
    };

    let request_id = request_id(request.headers()).unwrap_or("unknown").to_string();
    let (mut parts, body) = request.into_parts();

    parts.uri = match upstream.rewrite(&parts.uri) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream URI");
            return json_error(StatusCode::BAD_GATEWAY, "Upstream request failed");
        }
    };
    strip_hop_by_hop(&mut parts.headers);
    if let Some(host) = parts.headers.remove(header::HOST) {
        parts.headers.insert("x-forwarded-host", host);
    }
    if let Ok(authority) = HeaderValue::from_str(upstream.authority().as_str()) {
        parts.headers.insert(header::HOST, authority);
    }

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        uri = %parts.uri,
        "Forwarding request upstream"
    );

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            json_error(StatusCode::BAD_GATEWAY, "Upstream request failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_keeps_path_and_query() {
        let upstream = Upstream::parse("http://127.0.0.1:3000").unwrap();
        let uri: Uri = "/projects?tag=rust".parse().unwrap();
        assert_eq!(
            upstream.rewrite(&uri).unwrap().to_string(),
            "http://127.0.0.1:3000/projects?tag=rust"
        );
        let root: Uri = "http://ignored.example/".parse().unwrap();
        assert_eq!(upstream.rewrite(&root).unwrap().to_string(), "http://127.0.0.1:3000/");
    }

    #[test]
    fn test_parse_requires_host() {
        assert!(Upstream::parse("/relative").is_err());
        assert!(Upstream::parse("not a uri").is_err());
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("x-custom", HeaderValue::from_static("1"));
        strip_hop_by_hop(&mut headers);
        assert!(headers.get("connection").is_none());
        assert!(headers.get("x-custom").is_some());
    }
}
