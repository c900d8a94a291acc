//! Shared domain types for the Vectra exporter

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// API credentials and endpoint location.
///
/// Immutable once loaded; shared read-only by the token manager and the
/// retrieval engine for the lifetime of one run.
#[derive(Clone)]
pub struct VectraConfig {
    /// OAuth2 client ID
    pub client_id: String,

    /// OAuth2 client secret
    pub client_secret: String,

    /// Base URL of the Vectra platform, always ending with `/`
    pub base_url: String,
}

impl VectraConfig {
    /// Create a configuration, normalizing the base URL to end with `/`.
    #[must_use]
    pub fn new(client_id: String, client_secret: String, base_url: String) -> Self {
        let base_url =
            if base_url.ends_with('/') { base_url } else { format!("{base_url}/") };
        Self { client_id, client_secret, base_url }
    }

    /// Build a full URL for an endpoint path relative to the base URL.
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

// Manual Debug so the client secret never lands in logs.
impl fmt::Debug for VectraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectraConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// A single host record as returned by the platform.
///
/// The retrieval engine treats records as opaque units; only the CSV
/// projector interprets individual fields.
pub type HostRecord = serde_json::Value;

/// One page of the paginated hosts response.
///
/// `results` is required; a response without it is a malformed page.
/// `next` carries the full URL of the following page, or null on the
/// final page.
#[derive(Debug, Deserialize)]
pub struct HostPage {
    pub results: Vec<HostRecord>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Host state filter accepted by the hosts endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostState {
    #[default]
    Active,
    Inactive,
    All,
}

impl HostState {
    /// Query parameter value, or `None` when no filter should be sent.
    #[must_use]
    pub fn as_query_param(&self) -> Option<&'static str> {
        match self {
            Self::Active => Some("active"),
            Self::Inactive => Some("inactive"),
            Self::All => None,
        }
    }
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::All => "all",
        };
        write!(f, "{label}")
    }
}

impl FromStr for HostState {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "all" => Ok(Self::All),
            other => Err(format!("invalid host state: {other}")),
        }
    }
}
