//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): requests seen by the gate, by route class
//! - `gate_auth_rejected_total` (counter): protected requests turned away, by reason
//! - `gate_rate_limited_total` (counter): 429s from the API limiter, by scope
//! - `login_attempts_total` (counter): login outcomes (succeeded, failed, blocked)
//! - `alerts_sent_total` (counter): outbound alerts, by result
//! - `gate_swept_records_total` (counter): expired records removed by the sweeper
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exporter runs on its own listener

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(class: &'static str) {
    metrics::counter!("gate_requests_total", "class" => class).increment(1);
}

pub fn record_auth_rejected(reason: &'static str) {
    metrics::counter!("gate_auth_rejected_total", "reason" => reason).increment(1);
}

pub fn record_rate_limited(scope: &str) {
    metrics::counter!("gate_rate_limited_total", "scope" => scope.to_string()).increment(1);
}

pub fn record_login_attempt(outcome: &'static str) {
    metrics::counter!("login_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_alert(result: &'static str) {
    metrics::counter!("alerts_sent_total", "result" => result).increment(1);
}

pub fn record_swept(store: &'static str, count: usize) {
    metrics::counter!("gate_swept_records_total", "store" => store).increment(count as u64);
}
