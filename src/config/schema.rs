//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the portfolio gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Deployment environment; decides which protections are active.
    pub environment: Environment,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Site renderer that receives every request the gate does not answer itself.
    pub upstream: UpstreamConfig,

    /// Path classification table.
    pub routes: RouteTableConfig,

    /// API rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Admin login throttling.
    pub login: LoginThrottleConfig,

    /// Admin credentials and session tokens.
    pub admin: AdminConfig,

    /// Security response headers.
    pub headers: HeaderConfig,

    /// Outbound login alerts.
    pub alerts: AlertConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

/// What an [`Environment`] switches on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentEffects {
    pub rate_limiting: bool,
    pub hsts: bool,
    pub deny_framing: bool,
    pub secure_cookies: bool,
}

impl Environment {
    pub fn effects(self) -> EnvironmentEffects {
        match self {
            Environment::Production => EnvironmentEffects {
                rate_limiting: true,
                hsts: true,
                deny_framing: true,
                secure_cookies: true,
            },
            Environment::Development => EnvironmentEffects {
                rate_limiting: false,
                hsts: false,
                deny_framing: false,
                secure_cookies: false,
            },
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Timeout for outbound enrichment and alert calls in seconds.
    pub outbound_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            outbound_secs: 3,
        }
    }
}

/// Upstream site renderer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL, e.g. "http://127.0.0.1:3000". `None` answers 404 for unknown paths.
    pub url: Option<String>,
}

/// Path classification table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteTableConfig {
    /// Prefixes that require an admin session.
    pub protected_prefixes: Vec<String>,

    /// Prefixes exempt from the session requirement.
    pub public_prefixes: Vec<String>,

    /// Prefixes served as static assets (never inspected).
    pub static_prefixes: Vec<String>,

    /// Prefix marking API paths (JSON errors instead of redirects).
    pub api_prefix: String,

    /// Login page used for redirects.
    pub login_path: String,
}

impl Default for RouteTableConfig {
    fn default() -> Self {
        Self {
            protected_prefixes: vec!["/admin".to_string(), "/api/upload".to_string()],
            public_prefixes: vec!["/admin/login".to_string()],
            static_prefixes: vec!["/_next/".to_string(), "/static/".to_string()],
            api_prefix: "/api/".to_string(),
            login_path: "/admin/login".to_string(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting (only effective in production).
    pub enabled: bool,

    /// Window length in seconds.
    pub window_secs: u64,

    /// Ceiling for API paths with no strict prefix.
    pub default_limit: u32,

    /// Per-prefix ceilings; the first matching prefix wins.
    pub strict: Vec<StrictLimit>,

    /// Interval of the expired-record sweeper; 0 disables it.
    pub sweep_interval_secs: u64,

    /// Headers consulted for the client IP, in order, before the peer address.
    pub client_ip_headers: Vec<String>,
}

/// Ceiling override for a path prefix.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct StrictLimit {
    pub prefix: String,
    pub limit: u32,
}

impl StrictLimit {
    fn new(prefix: &str, limit: u32) -> Self {
        Self {
            prefix: prefix.to_string(),
            limit,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 15 * 60,
            default_limit: 1000,
            strict: vec![
                StrictLimit::new("/api/auth", 10),
                StrictLimit::new("/api/admin", 200),
                StrictLimit::new("/api/projects", 500),
                StrictLimit::new("/api/about", 500),
                StrictLimit::new("/api/experience", 500),
                StrictLimit::new("/api/contact", 500),
            ],
            sweep_interval_secs: 300,
            client_ip_headers: vec!["x-forwarded-for".to_string()],
        }
    }
}

/// Admin login throttling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginThrottleConfig {
    /// Failures allowed inside one window before lockout.
    pub max_attempts: u32,

    /// Failure counting window in seconds.
    pub window_secs: u64,

    /// Lockout length in seconds.
    pub lockout_secs: u64,
}

impl Default for LoginThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_secs: 10 * 60,
            lockout_secs: 10 * 60,
        }
    }
}

/// Admin credentials and session tokens.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Plain admin password (development convenience).
    pub password: Option<String>,

    /// Hex SHA-256 of `password + password_salt`.
    pub password_sha256: Option<String>,

    /// Hex 64-byte scrypt key of the password with `password_salt`. Wins over
    /// `password_sha256` when both are set.
    pub password_scrypt: Option<String>,

    /// Salt appended before hashing.
    pub password_salt: Option<String>,

    /// HMAC secret for session tokens.
    pub jwt_secret: Option<String>,

    /// Session lifetime in seconds.
    pub token_ttl_secs: u64,

    /// Subject claim of admin sessions.
    pub subject: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: None,
            password_sha256: None,
            password_scrypt: None,
            password_salt: None,
            jwt_secret: None,
            token_ttl_secs: 24 * 60 * 60,
            subject: "admin".to_string(),
        }
    }
}

/// Security response headers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Origin allowed to frame the site outside production.
    pub preview_origin: String,

    /// HSTS max-age in seconds.
    pub hsts_max_age_secs: u64,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            preview_origin: "https://vercel.live".to_string(),
            hsts_max_age_secs: 31_536_000,
        }
    }
}

/// Outbound login alerts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertConfig {
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,

    /// Telegram Bot API base URL.
    pub telegram_api_base: String,

    /// Geolocation lookup base URL; the IP is appended as a path segment.
    pub geo_lookup_url: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            telegram_chat_id: None,
            telegram_api_base: "https://api.telegram.org".to_string(),
            geo_lookup_url: "http://ip-api.com/json".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
