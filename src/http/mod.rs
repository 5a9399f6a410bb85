//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → security::gate (classify, shape check, rate limit, headers)
//!     → admin routes, or forward.rs (upstream renderer)
//!     → response.rs (JSON errors)
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{build_app, AppState, HttpServer};
