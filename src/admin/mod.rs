//! Admin session endpoints.
//!
//! Login composes the login throttle with password verification and token
//! issue; `status` is the one route that requires a fully verified session.

pub mod auth;
pub mod handlers;
pub mod password;

use axum::{
    routing::{get, post},
    Router,
};

use crate::http::server::AppState;
use self::handlers::*;

pub use auth::{AdminClaims, AuthError, RequireAdmin, TokenVerifier};
pub use password::PasswordCheck;

pub fn setup_admin_router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/logout", post(logout))
        .route("/api/admin/verify", get(verify))
        .route("/api/admin/check-auth", get(check_auth))
        .route("/api/admin/clear-rate-limit", post(clear_rate_limit))
        .route("/api/admin/status", get(get_status))
}
