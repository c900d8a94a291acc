//! Error types used throughout the exporter

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the Vectra exporter
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum VectraError {
    /// Missing or invalid credentials/URL. Fatal before any network call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Identity endpoint rejected the request or was unreachable.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Local token cache could not be read or written.
    #[error("Token cache error: {0}")]
    TokenCache(String),

    /// Resource endpoint returned an unusable response.
    #[error("API error: {0}")]
    Api(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type alias for exporter operations
pub type Result<T> = std::result::Result<T, VectraError>;
