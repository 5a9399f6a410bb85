//! Admin token extraction and the gate's shape-only check.
//!
//! [`quick_check`] looks at structure and claims without verifying the
//! signature. Its success value, [`QuickRejectOnly`], only means "not obviously
//! invalid". Handlers that act on an admin session must verify it fully with
//! [`crate::admin::auth::TokenVerifier`].

use axum::http::{header, HeaderMap};
use axum_extra::extract::CookieJar;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::Deserialize;
use thiserror::Error;

/// Canonical session cookie.
pub const ADMIN_COOKIE: &str = "admin_token";
/// Legacy session cookie, same semantics.
pub const LEGACY_ADMIN_COOKIE: &str = "admin-token";

/// Why a token failed the shape check. The gate treats every variant the
/// same way as a missing token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenShapeError {
    #[error("no token presented")]
    Missing,
    #[error("malformed token: {0}")]
    Malformed(&'static str),
    #[error("token subject is not the admin subject")]
    WrongSubject,
    #[error("token expired")]
    Expired,
}

impl TokenShapeError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenShapeError::Missing => "missing",
            TokenShapeError::Malformed(_) => "malformed",
            TokenShapeError::WrongSubject => "wrong_subject",
            TokenShapeError::Expired => "expired",
        }
    }
}

/// A token that passed the shape check. It is not a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickRejectOnly {
    pub subject: String,
    pub expires_at: Option<i64>,
}

#[derive(Deserialize)]
struct ShapeClaims {
    sub: Option<String>,
    exp: Option<serde_json::Value>,
}

/// Session token from the cookies only, canonical name first.
pub fn token_from_cookies(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    [ADMIN_COOKIE, LEGACY_ADMIN_COOKIE]
        .into_iter()
        .filter_map(|name| jar.get(name))
        .map(|c| c.value().to_string())
        .find(|v| !v.is_empty())
}

/// `Authorization: Bearer <token>` value.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Cookie `admin_token`, then `admin-token`, then the bearer header.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    token_from_cookies(headers).or_else(|| bearer_token(headers))
}

/// Structural validation: three segments, base64url JSON payload, expected
/// subject, and `exp` (when numeric) strictly after `now_secs`.
pub fn quick_check(
    token: &str,
    expected_subject: &str,
    now_secs: u64,
) -> Result<QuickRejectOnly, TokenShapeError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenShapeError::Malformed("expected three segments"));
    }

    // base64url is expected; the standard alphabet is tolerated.
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .map_err(|_| TokenShapeError::Malformed("payload is not base64url"))?;
    let claims: ShapeClaims = serde_json::from_slice(&bytes)
        .map_err(|_| TokenShapeError::Malformed("payload is not a JSON object"))?;

    let subject = claims.sub.ok_or(TokenShapeError::WrongSubject)?;
    if subject != expected_subject {
        return Err(TokenShapeError::WrongSubject);
    }

    let expires_at = claims.exp.as_ref().and_then(serde_json::Value::as_f64);
    if let Some(exp) = expires_at {
        if exp <= now_secs as f64 {
            return Err(TokenShapeError::Expired);
        }
    }

    Ok(QuickRejectOnly {
        subject,
        expires_at: expires_at.map(|e| e as i64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const NOW: u64 = 1_700_000_000;

    fn token(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_accepts_admin_shape() {
        let ok = quick_check(&token(r#"{"sub":"admin","exp":1700000100}"#), "admin", NOW).unwrap();
        assert_eq!(ok.subject, "admin");
        assert_eq!(ok.expires_at, Some(1_700_000_100));

        // No exp claim is tolerated by the shape check.
        assert!(quick_check(&token(r#"{"sub":"admin"}"#), "admin", NOW).is_ok());
    }

    #[test]
    fn test_padded_payload_is_tolerated() {
        let padded = format!(
            "h.{}.s",
            base64::engine::general_purpose::URL_SAFE.encode(r#"{"sub":"admin","ab":1}"#)
        );
        assert!(padded.contains("=="));
        assert!(quick_check(&padded, "admin", NOW).is_ok());
    }

    #[test]
    fn test_standard_alphabet_is_tolerated() {
        // "?>" and "~~" encode to '/' and '+' in the standard alphabet.
        let payload = r#"{"sub":"admin","n":"?>?~~"}"#;
        let standard = base64::engine::general_purpose::STANDARD.encode(payload);
        assert!(standard.contains('/') || standard.contains('+'));
        let token = format!("h.{}.s", standard);
        assert!(quick_check(&token, "admin", NOW).is_ok());
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            quick_check("only.two", "admin", NOW),
            Err(TokenShapeError::Malformed("expected three segments"))
        );
        assert!(matches!(
            quick_check("a.%%%.c", "admin", NOW),
            Err(TokenShapeError::Malformed(_))
        ));
        assert!(matches!(
            quick_check(&token("not json"), "admin", NOW),
            Err(TokenShapeError::Malformed(_))
        ));
        assert_eq!(
            quick_check(&token(r#"{"sub":"guest"}"#), "admin", NOW),
            Err(TokenShapeError::WrongSubject)
        );
        assert_eq!(
            quick_check(&token(r#"{"sub":"admin","exp":1700000000}"#), "admin", NOW),
            Err(TokenShapeError::Expired)
        );
    }

    #[test]
    fn test_extraction_priority() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));

        headers.insert(header::COOKIE, HeaderValue::from_static("admin-token=legacy"));
        assert_eq!(extract_token(&headers).as_deref(), Some("legacy"));

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("admin-token=legacy; admin_token=canonical"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("canonical"));
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_token(&headers), None);
    }
}
