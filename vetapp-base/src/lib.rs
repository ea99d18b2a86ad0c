//! Shared plumbing for vetapp processes: settings, tracing, metrics and the
//! HTTP server.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::panic)]

pub use agent::*;
pub use metrics::CoreMetrics;
pub use server::Server;

pub mod settings;

mod agent;
mod metrics;
mod server;
