//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → classifier.rs (route table lookup)
//!     → matcher.rs (evaluate prefix/asset conditions)
//!     → Return: RouteClass
//!
//! Route Compilation (at startup):
//!     RouteTableConfig
//!     → Compile prefix matchers
//!     → Freeze as immutable RouteClassifier
//! ```
//!
//! # Design Decisions
//! - Route table compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Every path gets exactly one class

pub mod classifier;
pub mod matcher;

pub use classifier::{RouteClass, RouteClassifier};
