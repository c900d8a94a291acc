//! Authenticated HTTP transport for the Vectra resource API
//!
//! One request, one response: retry policy belongs to the caller, because
//! the hosts engine owes a specific backoff schedule to the shared server.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use tracing::debug;
use vectra_domain::{Result, VectraConfig, VectraError};

/// Bearer-authenticated transport bound to one platform base URL.
#[derive(Debug, Clone)]
pub struct ApiTransport {
    base_url: String,
    http: Client,
}

impl ApiTransport {
    /// Build a transport with an explicit per-request timeout.
    pub fn new(config: &VectraConfig, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VectraError::Network(e.to_string()))?;
        Ok(Self { base_url: config.base_url.clone(), http })
    }

    /// Perform an authenticated GET against an endpoint relative to the
    /// base URL.
    ///
    /// Non-200 statuses are returned as responses, not errors; only a
    /// transport-level failure produces `Err`.
    pub async fn get(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        access_token: &str,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint.trim_start_matches('/'));
        debug!(%url, "sending GET request");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .bearer_auth(access_token)
            .query(params)
            .send()
            .await
            .map_err(|e| VectraError::Network(e.to_string()))?;

        debug!(%url, status = %response.status(), "received response");
        Ok(response)
    }
}
