//! Observability setup for the checkout upsell widget.
//!
//! This crate provides:
//! - `LogConfig` / `init` - `tracing` subscriber installation (JSON or human output)
//! - `session_span` - The span every session's log lines are recorded under

mod logging;
mod span;

pub use logging::*;
pub use span::*;
