//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows and lifetimes within (0, one year], ceilings > 0)
//! - Check prefixes and URLs are well formed
//! - Refuse production configs without a session secret
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::security::clock::MAX_DURATION_SECS;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if let Some(upstream) = &config.upstream.url {
        match url::Url::parse(upstream) {
            Ok(u) if u.scheme() == "http" => {}
            Ok(u) => errors.push(ValidationError::new(
                "upstream.url",
                format!("unsupported scheme '{}' (only http)", u.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new("upstream.url", e.to_string())),
        }
    }

    for (name, prefixes) in [
        ("routes.protected_prefixes", &config.routes.protected_prefixes),
        ("routes.public_prefixes", &config.routes.public_prefixes),
        ("routes.static_prefixes", &config.routes.static_prefixes),
    ] {
        for prefix in prefixes {
            if !prefix.starts_with('/') {
                errors.push(ValidationError::new(name, format!("'{}' must start with '/'", prefix)));
            }
        }
    }
    if !config.routes.login_path.starts_with('/') {
        errors.push(ValidationError::new("routes.login_path", "must start with '/'"));
    }

    for (field, secs) in [
        ("rate_limit.window_secs", config.rate_limit.window_secs),
        ("login.window_secs", config.login.window_secs),
        ("login.lockout_secs", config.login.lockout_secs),
        ("admin.token_ttl_secs", config.admin.token_ttl_secs),
    ] {
        if secs == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        } else if secs > MAX_DURATION_SECS {
            errors.push(ValidationError::new(
                field,
                format!("must be at most {} seconds", MAX_DURATION_SECS),
            ));
        }
    }

    let rl = &config.rate_limit;
    if rl.default_limit == 0 {
        errors.push(ValidationError::new("rate_limit.default_limit", "must be greater than 0"));
    }
    for strict in &rl.strict {
        if strict.limit == 0 {
            errors.push(ValidationError::new(
                "rate_limit.strict",
                format!("limit for '{}' must be greater than 0", strict.prefix),
            ));
        }
        if !strict.prefix.starts_with('/') {
            errors.push(ValidationError::new(
                "rate_limit.strict",
                format!("'{}' must start with '/'", strict.prefix),
            ));
        }
    }

    let login = &config.login;
    if login.max_attempts == 0 {
        errors.push(ValidationError::new("login.max_attempts", "must be greater than 0"));
    }

    let admin = &config.admin;
    if admin.subject.is_empty() {
        errors.push(ValidationError::new("admin.subject", "must not be empty"));
    }
    for (field, digest) in [
        ("admin.password_scrypt", &admin.password_scrypt),
        ("admin.password_sha256", &admin.password_sha256),
    ] {
        if digest.is_some() && admin.password_salt.is_none() {
            errors.push(ValidationError::new(field, "requires password_salt"));
        }
    }
    if config.environment.is_production() {
        match admin.jwt_secret.as_deref() {
            None | Some("") => errors.push(ValidationError::new(
                "admin.jwt_secret",
                "required in production",
            )),
            _ => {}
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "is not a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
