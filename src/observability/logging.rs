//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config, overridable by `RUST_LOG`
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Environment, GateConfig};

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(log_level: &str) -> String {
    format!("portfolio_gate={level},tower_http={level}", level = log_level)
}

/// Install the global subscriber. Safe to call once per process.
pub fn init_logging(config: &GateConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(&config.observability.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.environment {
        Environment::Production => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init(),
        Environment::Development => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    if let Err(e) = result {
        eprintln!("logging already initialised: {}", e);
    }
}
