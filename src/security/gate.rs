//! The request gate middleware.
//!
//! # Data Flow
//! ```text
//! Request
//!     → classify path
//!     → StaticAsset: pass through untouched
//!     → Protected: token shape check (401 JSON / redirect to login)
//!     → API path in production: per-prefix rate limit (429)
//!     → next handler
//!     → rate-limit headers + security headers on the response
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::config::GateConfig;
use crate::observability::metrics;
use crate::routing::{RouteClass, RouteClassifier};
use crate::security::client_key::client_ip;
use crate::security::clock::Clock;
use crate::security::headers::SecurityHeaders;
use crate::security::rate_limit::{apply_rate_limit_headers, rate_limited_response, ApiRateLimiter};
use crate::security::token::{extract_token, quick_check, QuickRejectOnly, TokenShapeError};

/// Everything the gate needs per request, built once at startup.
pub struct Gate {
    classifier: RouteClassifier,
    limiter: Arc<ApiRateLimiter>,
    headers: SecurityHeaders,
    rate_limiting: bool,
    ip_headers: Vec<String>,
    subject: String,
    clock: Arc<dyn Clock>,
}

impl Gate {
    pub fn new(config: &GateConfig, limiter: Arc<ApiRateLimiter>, clock: Arc<dyn Clock>) -> Self {
        Self {
            classifier: RouteClassifier::from_config(&config.routes),
            limiter,
            headers: SecurityHeaders::new(config.environment, &config.headers),
            rate_limiting: config.environment.effects().rate_limiting && config.rate_limit.enabled,
            ip_headers: config.rate_limit.client_ip_headers.clone(),
            subject: config.admin.subject.clone(),
            clock,
        }
    }

    pub fn classifier(&self) -> &RouteClassifier {
        &self.classifier
    }

    pub fn rate_limiting(&self) -> bool {
        self.rate_limiting
    }

    /// Shape check of whatever token the request carries.
    pub fn admit<B>(&self, request: &Request<B>) -> Result<QuickRejectOnly, TokenShapeError> {
        let token = extract_token(request.headers()).ok_or(TokenShapeError::Missing)?;
        quick_check(&token, &self.subject, self.clock.unix_secs())
    }

    fn unauthorized(&self, path: &str) -> Response {
        if self.classifier.is_api(path) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Unauthorized" })),
            )
                .into_response();
        }

        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("redirect", path)
            .finish();
        Redirect::temporary(&format!("{}?{}", self.classifier.login_path(), query)).into_response()
    }
}

/// Axum middleware; install with `middleware::from_fn_with_state(Arc<Gate>, gate_middleware)`.
pub async fn gate_middleware(
    State(gate): State<Arc<Gate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let class = gate.classifier.classify(&path);
    metrics::record_request(class.as_str());

    if class == RouteClass::StaticAsset {
        return next.run(request).await;
    }

    if class == RouteClass::Protected {
        if let Err(e) = gate.admit(&request) {
            tracing::info!(path = %path, reason = e.reason(), "Protected route rejected");
            metrics::record_auth_rejected(e.reason());
            let mut response = gate.unauthorized(&path);
            gate.headers.apply(response.headers_mut());
            return response;
        }
    }

    let mut decision = None;
    if gate.rate_limiting && gate.classifier.is_api(&path) {
        let ip = client_ip(&request, &gate.ip_headers);
        let check = gate.limiter.check(&path, &ip);
        if !check.decision.allowed {
            let scope = check.scope.as_deref().unwrap_or("default");
            tracing::warn!(
                ip = %ip,
                path = %path,
                scope = %scope,
                limit = check.decision.limit,
                "Rate limit exceeded"
            );
            metrics::record_rate_limited(scope);
            let mut response = rate_limited_response(&check.decision, gate.clock.now());
            gate.headers.apply(response.headers_mut());
            return response;
        }
        decision = Some(check.decision);
    }

    let mut response = next.run(request).await;
    if let Some(decision) = decision {
        apply_rate_limit_headers(response.headers_mut(), &decision);
    }
    gate.headers.apply(response.headers_mut());
    response
}
