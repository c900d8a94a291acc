//! Configuration loading
//!
//! Loads API credentials from an env file with fallback to the process
//! environment.

pub mod loader;

// Re-export commonly used items
pub use loader::load;
