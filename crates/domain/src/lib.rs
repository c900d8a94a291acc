//! # Vectra Domain
//!
//! Domain types and models shared by the exporter crates.
//!
//! This crate contains:
//! - Configuration and host record types
//! - Error types and the `Result` alias
//!
//! ## Architecture
//! - No dependencies on other vectra crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
