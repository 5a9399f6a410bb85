//! End-to-end tests against a running gate and a mock upstream.

use std::sync::Arc;
use std::time::Duration;

use portfolio_gate::config::Environment;
use portfolio_gate::http::{AppState, HttpServer};
use portfolio_gate::lifecycle::Shutdown;
use portfolio_gate::security::clock::ManualClock;

mod common;

async fn start_gate(upstream: std::net::SocketAddr) -> (std::net::SocketAddr, Shutdown, tokio::task::JoinHandle<()>) {
    let mut config = common::config(Environment::Production);
    config.upstream.url = Some(format!("http://{}", upstream));

    let state = AppState::new(config, Arc::new(ManualClock::at_unix(common::START)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();

    let handle = tokio::spawn(async move {
        HttpServer::new(state).run(listener, server_shutdown).await.unwrap();
    });

    (addr, shutdown, handle)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_forwards_to_upstream() {
    let upstream = common::start_mock_upstream().await;
    let (addr, shutdown, handle) = start_gate(upstream).await;
    let client = client();

    let res = client
        .get(format!("http://{}/projects?tag=rust", addr))
        .send()
        .await
        .expect("gate unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    assert_eq!(res.headers()["x-frame-options"], "DENY");
    assert!(res.headers().get("x-request-id").is_some());
    assert_eq!(res.text().await.unwrap(), "upstream GET /projects?tag=rust");

    // API calls are forwarded too, with rate-limit headers keyed on the peer.
    let res = client
        .post(format!("http://{}/api/contact", addr))
        .body("hello")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-ratelimit-limit"], "500");
    assert_eq!(res.text().await.unwrap(), "upstream POST /api/contact");

    // Protected pages never reach the upstream without a session.
    let res = client
        .get(format!("http://{}/admin", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 307);
    assert_eq!(res.headers()["location"], "/admin/login?redirect=%2Fadmin");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not shut down")
        .unwrap();
}

#[tokio::test]
async fn test_upstream_failure_is_502() {
    let upstream = common::closed_port().await;
    let (addr, shutdown, _handle) = start_gate(upstream).await;

    let res = client()
        .get(format!("http://{}/", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Upstream request failed" }));

    shutdown.trigger();
}
