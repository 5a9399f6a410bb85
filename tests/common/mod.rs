//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

use portfolio_gate::config::{Environment, GateConfig};
use portfolio_gate::http::{build_app, AppState};
use portfolio_gate::security::clock::ManualClock;

pub const START: u64 = 1_700_000_000;
pub const SECRET: &str = "integration-secret";
pub const PASSWORD: &str = "correct horse";

pub fn config(environment: Environment) -> GateConfig {
    let mut config = GateConfig::default();
    config.environment = environment;
    config.admin.password = Some(PASSWORD.to_string());
    config.admin.jwt_secret = Some(SECRET.to_string());
    config
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new(config: GateConfig) -> Self {
        let clock = Arc::new(ManualClock::at_unix(START));
        let state = AppState::new(config, clock.clone());
        Self {
            router: build_app(state.clone()),
            state,
            clock,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, path: &str) -> Response<Body> {
        self.send(Request::get(path).body(Body::empty()).unwrap()).await
    }

    pub fn advance(&self, secs: u64) {
        self.clock.advance(Duration::from_secs(secs));
    }
}

pub fn get_from(path: &str, ip: &str) -> Request<Body> {
    Request::get(path)
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap()
}

pub fn login_request(password: &str, ip: &str, user_agent: &str) -> Request<Body> {
    Request::post("/api/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", ip)
        .header(header::USER_AGENT, user_agent)
        .body(Body::from(serde_json::json!({ "password": password }).to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Token with the right shape and an arbitrary payload; the signature is junk.
pub fn shaped_token(payload: &str) -> String {
    format!(
        "{}.{}.not-a-signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload)
    )
}

/// Properly signed admin token.
pub fn signed_token(secret: &str, sub: &str, exp: u64) -> String {
    let claims = serde_json::json!({ "sub": sub, "role": "admin", "iat": START, "exp": exp });
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Start a mock upstream on an ephemeral port that answers every request with
/// `upstream <METHOD> <target>`.
pub async fn start_mock_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        }
                        let head = String::from_utf8_lossy(&buf);
                        let request_line = head.lines().next().unwrap_or_default();
                        let mut parts = request_line.split_whitespace();
                        let body = format!(
                            "upstream {} {}",
                            parts.next().unwrap_or_default(),
                            parts.next().unwrap_or_default()
                        );
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
