use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::auth::RequireAdmin;
use crate::alerts::{LoginAlert, LoginEvent};
use crate::http::response::{json_error, unauthenticated};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::client_key::{client_ip, fingerprint, user_agent};
use crate::security::counter_store::CounterStore;
use crate::security::token::{bearer_token, token_from_cookies, ADMIN_COOKIE, LEGACY_ADMIN_COOKIE};

const MAX_LOGIN_BODY: usize = 16 * 1024;

#[derive(Deserialize)]
struct LoginRequest {
    password: Option<String>,
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub environment: &'static str,
    pub rate_limiting: bool,
    pub tracked_rate_limit_keys: usize,
    pub tracked_login_fingerprints: usize,
}

/// `Set-Cookie` value for an admin session cookie.
pub fn session_cookie(name: &str, value: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
        name, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub async fn login(State(state): State<AppState>, request: Request<Body>) -> Response {
    let ip = client_ip(&request, &state.config.rate_limit.client_ip_headers);
    let agent = user_agent(&request);
    let key = fingerprint(&ip, &agent);
    let alert = |event| LoginAlert {
        event,
        ip: ip.clone(),
        user_agent: agent.clone(),
    };

    let decision = state.throttle.check(&key);
    if !decision.allowed {
        let retry_after = decision.retry_after_secs.unwrap_or(1);
        tracing::warn!(ip = %ip, retry_after, "Admin login blocked");
        metrics::record_login_attempt("blocked");
        state.alerts.dispatch(alert(LoginEvent::Blocked {
            retry_after_secs: retry_after,
        }));
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after.to_string())],
            Json(serde_json::json!({ "error": "Too many attempts. Please try again later." })),
        )
            .into_response();
    }

    let body = match to_bytes(request.into_body(), MAX_LOGIN_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => return json_error(StatusCode::BAD_REQUEST, "Invalid request body"),
    };
    let password = match serde_json::from_slice::<LoginRequest>(&body) {
        Ok(req) => req.password.unwrap_or_default(),
        Err(_) => return json_error(StatusCode::BAD_REQUEST, "Invalid request body"),
    };
    if password.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "Password required");
    }

    if !state.password.verify(&password) {
        state.throttle.record_failure(&key);
        tracing::warn!(ip = %ip, "Admin login failed");
        metrics::record_login_attempt("failed");
        state.alerts.dispatch(alert(LoginEvent::Failed));
        return json_error(StatusCode::UNAUTHORIZED, "Invalid password");
    }

    state.throttle.record_success(&key);

    let token = match state.verifier.issue() {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to issue admin token");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Login failed");
        }
    };

    tracing::info!(ip = %ip, "Admin login succeeded");
    metrics::record_login_attempt("succeeded");
    state.alerts.dispatch(alert(LoginEvent::Succeeded));

    let secure = state.config.environment.effects().secure_cookies;
    let ttl = state.verifier.ttl_secs();
    (
        AppendHeaders([
            (header::SET_COOKIE, session_cookie(ADMIN_COOKIE, &token, ttl, secure)),
            (header::SET_COOKIE, session_cookie(LEGACY_ADMIN_COOKIE, &token, ttl, secure)),
        ]),
        Json(serde_json::json!({ "success": true, "message": "Login successful" })),
    )
        .into_response()
}

pub async fn logout(State(state): State<AppState>) -> Response {
    let secure = state.config.environment.effects().secure_cookies;
    (
        AppendHeaders([
            (header::SET_COOKIE, session_cookie(ADMIN_COOKIE, "", 0, secure)),
            (header::SET_COOKIE, session_cookie(LEGACY_ADMIN_COOKIE, "", 0, secure)),
        ]),
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    )
        .into_response()
}

/// Cookie session check.
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = token_from_cookies(&headers) else {
        return unauthenticated("No token provided");
    };
    match state.verifier.verify(&token) {
        Ok(_) => Json(serde_json::json!({ "authenticated": true })).into_response(),
        Err(e) => {
            tracing::debug!(reason = e.reason(), "Session verification failed");
            unauthenticated("Invalid token")
        }
    }
}

/// Bearer header first, then cookies.
pub async fn check_auth(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let authenticated = bearer_token(&headers)
        .or_else(|| token_from_cookies(&headers))
        .is_some_and(|token| state.verifier.verify(&token).is_ok());
    let status = if authenticated {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    (status, Json(serde_json::json!({ "authenticated": authenticated }))).into_response()
}

pub async fn clear_rate_limit(State(state): State<AppState>) -> Response {
    if state.config.environment.is_production() {
        return json_error(
            StatusCode::FORBIDDEN,
            "This endpoint is only available in development",
        );
    }
    state.counters.clear();
    tracing::info!("API rate limits cleared");
    Json(serde_json::json!({
        "success": true,
        "message": "Rate limits cleared successfully"
    }))
    .into_response()
}

pub async fn get_status(State(state): State<AppState>, RequireAdmin(_): RequireAdmin) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.as_str(),
        rate_limiting: state.gate.rate_limiting(),
        tracked_rate_limit_keys: state.counters.len(),
        tracked_login_fingerprints: state.throttle.len(),
    })
}
