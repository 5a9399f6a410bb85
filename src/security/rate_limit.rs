//! Per-prefix API rate limiting.
//!
//! The first strict prefix matching the path picks the ceiling and scopes the
//! key (`ip:prefix`); anything else shares the default ceiling keyed by IP.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::RateLimitConfig;
use crate::security::clock::{secs_until_ceil, Clock};
use crate::security::client_key::rate_limit_key;
use crate::security::counter_store::{CounterStore, RateDecision};

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// A counted API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateCheck {
    /// Strict prefix that matched, if any.
    pub scope: Option<String>,
    pub decision: RateDecision,
}

/// API limiter over an injected [`CounterStore`].
pub struct ApiRateLimiter {
    store: Arc<dyn CounterStore>,
    config: RateLimitConfig,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl ApiRateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let window = Duration::from_secs(config.window_secs);
        Self {
            store,
            config,
            window,
            clock,
        }
    }

    /// Ceiling and scope for a path.
    pub fn limit_for(&self, path: &str) -> (u32, Option<&str>) {
        self.config
            .strict
            .iter()
            .find(|s| path.starts_with(&s.prefix))
            .map(|s| (s.limit, Some(s.prefix.as_str())))
            .unwrap_or((self.config.default_limit, None))
    }

    /// Count one request from `ip` to `path`.
    pub fn check(&self, path: &str, ip: &str) -> RateCheck {
        let (limit, scope) = self.limit_for(path);
        let key = rate_limit_key(ip, scope);
        let decision = self.store.hit(&key, limit, self.window, self.clock.now());
        RateCheck {
            scope: scope.map(str::to_string),
            decision,
        }
    }
}

/// RFC 3339 UTC timestamp with millisecond precision.
pub fn format_reset(reset: SystemTime) -> String {
    DateTime::<Utc>::from(reset).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Attach limit, remaining and reset headers.
pub fn apply_rate_limit_headers(headers: &mut HeaderMap, decision: &RateDecision) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    if let Ok(v) = HeaderValue::from_str(&format_reset(decision.reset_time)) {
        headers.insert(X_RATELIMIT_RESET, v);
    }
}

/// 429 response for an exhausted window.
pub fn rate_limited_response(decision: &RateDecision, now: SystemTime) -> Response {
    let retry_after = secs_until_ceil(now, decision.reset_time).max(1);
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(serde_json::json!({ "error": "Rate limit exceeded" })),
    )
        .into_response();
    let headers = response.headers_mut();
    apply_rate_limit_headers(headers, decision);
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}
