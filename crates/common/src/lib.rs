//! # Vectra Common
//!
//! Reusable capabilities for the Vectra exporter:
//! - `auth`: OAuth2 client-credentials lifecycle (acquire, cache, refresh)
//! - `reporter`: injected console output capability

pub mod auth;
pub mod reporter;

pub use reporter::{ConsoleReporter, Reporter, SilentReporter};
