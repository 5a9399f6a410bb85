//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides for secrets)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → shared via AppState to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The deployment environment is an explicit value, not ad hoc string checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AdminConfig;
pub use schema::AlertConfig;
pub use schema::Environment;
pub use schema::GateConfig;
pub use schema::HeaderConfig;
pub use schema::LoginThrottleConfig;
pub use schema::RateLimitConfig;
pub use schema::RouteTableConfig;
pub use schema::StrictLimit;
