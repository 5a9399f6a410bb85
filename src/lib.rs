//! Rate limiting and admin authentication gate for the portfolio site.

pub mod admin;
pub mod alerts;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::GateConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
