//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → gate.rs (classify, token shape check, API rate limit)
//!     → headers.rs (security headers on every inspected response)
//!
//! Admin login:
//!     → login_throttle.rs (per-fingerprint lockout, before the password)
//! ```
//!
//! # Design Decisions
//! - Stores are constructed explicitly and injected, never global
//! - The API limiter and the login throttle never consult each other
//! - Time comes from an injected [`clock::Clock`]

pub mod client_key;
pub mod clock;
pub mod counter_store;
pub mod gate;
pub mod headers;
pub mod login_throttle;
pub mod rate_limit;
pub mod sweeper;
pub mod token;

pub use gate::{gate_middleware, Gate};
