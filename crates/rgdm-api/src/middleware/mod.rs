//! # Middleware
//!
//! - [`cors`]: per-prefix CORS policies.
//! - [`tracing_layer`]: request spans via `tower_http::trace`.

pub mod cors;
pub mod tracing_layer;
