//! Security response headers.
//!
//! # Responsibilities
//! - Stamp nosniff, XSS and referrer headers on every inspected response
//! - Build the Content-Security-Policy for the environment
//! - Add HSTS and X-Frame-Options only in production
//!
//! # Design Decisions
//! - Header values are rendered once at startup and cloned per response
//! - Outside production the configured preview origin may frame the site

use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::{Environment, HeaderConfig};

/// Precomputed header set for one environment.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    csp: HeaderValue,
    hsts: Option<HeaderValue>,
    deny_framing: bool,
}

impl SecurityHeaders {
    pub fn new(environment: Environment, config: &HeaderConfig) -> Self {
        let effects = environment.effects();
        let csp = content_security_policy(effects.deny_framing, &config.preview_origin);
        let hsts = effects.hsts.then(|| {
            HeaderValue::from_str(&format!(
                "max-age={}; includeSubDomains; preload",
                config.hsts_max_age_secs
            ))
            .unwrap_or_else(|_| HeaderValue::from_static("max-age=31536000"))
        });

        Self {
            csp: HeaderValue::from_str(&csp)
                .unwrap_or_else(|_| HeaderValue::from_static("default-src 'self'")),
            hsts,
            deny_framing: effects.deny_framing,
        }
    }

    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
        headers.insert(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        );
        headers.insert(header::CONTENT_SECURITY_POLICY, self.csp.clone());

        if self.deny_framing {
            headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        } else {
            headers.remove(header::X_FRAME_OPTIONS);
        }

        if let Some(hsts) = &self.hsts {
            headers.insert(header::STRICT_TRANSPORT_SECURITY, hsts.clone());
        }
    }
}

fn content_security_policy(deny_framing: bool, preview_origin: &str) -> String {
    let frame_src = if deny_framing {
        "frame-src 'none'".to_string()
    } else {
        format!("frame-src 'self' {}", preview_origin)
    };
    let frame_ancestors = if deny_framing {
        "frame-ancestors 'none'"
    } else {
        "frame-ancestors *"
    };

    let directives = [
        "default-src 'self'".to_string(),
        format!("script-src 'self' 'unsafe-eval' 'unsafe-inline' {} blob:", preview_origin),
        "style-src 'self' 'unsafe-inline'".to_string(),
        "img-src 'self' data: https: blob:".to_string(),
        "font-src 'self' data:".to_string(),
        "connect-src 'self' https: http://localhost:* ws://localhost:* blob:".to_string(),
        "media-src 'self' https: data:".to_string(),
        "object-src 'none'".to_string(),
        frame_src,
        frame_ancestors.to_string(),
    ];
    format!("{};", directives.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(env: Environment) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
        SecurityHeaders::new(env, &HeaderConfig::default()).apply(&mut headers);
        headers
    }

    #[test]
    fn test_production_headers() {
        let h = applied(Environment::Production);
        assert_eq!(h[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(h[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(
            h[header::STRICT_TRANSPORT_SECURITY],
            "max-age=31536000; includeSubDomains; preload"
        );
        let csp = h[header::CONTENT_SECURITY_POLICY].to_str().unwrap();
        assert!(csp.contains("frame-src 'none'"));
        assert!(csp.ends_with("frame-ancestors 'none';"));
    }

    #[test]
    fn test_development_headers() {
        let h = applied(Environment::Development);
        assert!(h.get(header::STRICT_TRANSPORT_SECURITY).is_none());
        assert!(h.get(header::X_FRAME_OPTIONS).is_none());
        assert_eq!(h[header::REFERRER_POLICY], "strict-origin-when-cross-origin");
        let csp = h[header::CONTENT_SECURITY_POLICY].to_str().unwrap();
        assert!(csp.contains("frame-src 'self' https://vercel.live"));
        assert!(csp.contains("frame-ancestors *"));
    }
}
