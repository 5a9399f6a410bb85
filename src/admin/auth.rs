//! Admin session tokens: issue and full verification.
//!
//! The gate only shape-checks tokens. Anything served here that acts on an
//! admin session goes through [`TokenVerifier::verify`], usually via the
//! [`RequireAdmin`] extractor.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AdminConfig;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::clock::Clock;
use crate::security::token::extract_token;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no token provided")]
    MissingToken,

    #[error("token signing secret is not configured")]
    MissingSecret,

    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("token expired")]
    Expired,

    #[error("token subject is not the admin subject")]
    WrongSubject,
}

impl AuthError {
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing",
            AuthError::MissingSecret => "no_secret",
            AuthError::Invalid(_) => "invalid",
            AuthError::Expired => "expired",
            AuthError::WrongSubject => "wrong_subject",
        }
    }
}

/// Claims carried by an admin session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub role: String,
    pub iat: u64,
    pub exp: u64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// HS256 issuer and verifier bound to the configured secret.
pub struct TokenVerifier {
    keys: Option<Keys>,
    subject: String,
    ttl_secs: u64,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    pub fn new(config: &AdminConfig, clock: Arc<dyn Clock>) -> Self {
        let keys = config
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|secret| Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            });
        if keys.is_none() {
            tracing::warn!("No token secret configured; admin logins will fail");
        }

        Self {
            keys,
            subject: config.subject.clone(),
            ttl_secs: config.token_ttl_secs,
            clock,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Sign a fresh admin session token.
    pub fn issue(&self) -> Result<String, AuthError> {
        let keys = self.keys.as_ref().ok_or(AuthError::MissingSecret)?;
        let now = self.clock.unix_secs();
        let claims = AdminClaims {
            sub: self.subject.clone(),
            role: ADMIN_ROLE.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)?)
    }

    /// Signature, expiry (against the injected clock) and subject.
    pub fn verify(&self, token: &str) -> Result<AdminClaims, AuthError> {
        let keys = self.keys.as_ref().ok_or(AuthError::MissingSecret)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<AdminClaims>(token, &keys.decoding, &validation)?.claims;
        if claims.exp <= self.clock.unix_secs() {
            return Err(AuthError::Expired);
        }
        if claims.sub != self.subject {
            return Err(AuthError::WrongSubject);
        }
        Ok(claims)
    }
}

/// Extractor for handlers that require a verified admin session.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AdminClaims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let result = extract_token(&parts.headers)
            .ok_or(AuthError::MissingToken)
            .and_then(|token| state.verifier.verify(&token));

        match result {
            Ok(claims) => Ok(RequireAdmin(claims)),
            Err(e) => {
                tracing::info!(path = %parts.uri.path(), reason = e.reason(), "Admin verification failed");
                metrics::record_auth_rejected(e.reason());
                Err((
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({ "error": "Unauthorized" })),
                )
                    .into_response())
            }
        }
    }
}
