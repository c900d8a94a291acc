//! Paginated host retrieval
//!
//! Walks the cursor-paginated hosts endpoint one page at a time. HTTP 504 is
//! the one status worth retrying: this backend times out under load, while
//! other errors (expired auth, bad request) will not improve on a second
//! attempt. Any failure terminates the walk and keeps whatever pages were
//! already collected; partial results are returned, not discarded.
//!
//! Pages are fetched strictly sequentially, with a fixed delay between
//! pages, as a rate-limiting courtesy to the shared server.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Response, StatusCode};
use tracing::{debug, warn};
use url::Url;
use vectra_common::reporter::Reporter;
use vectra_domain::{HostPage, HostRecord, HostState, Result, VectraConfig};

use crate::http::ApiTransport;

/// Hosts endpoint of the v3.4 resource API, relative to the base URL.
pub const HOSTS_ENDPOINT: &str = "api/v3.4/hosts";

/// Tunables for one retrieval run.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Hosts per page. Not validated client-side; the server enforces its
    /// own ceiling.
    pub page_size: u32,

    /// Host state filter; `All` sends no filter.
    pub state: HostState,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Retry attempts per page after the initial request.
    pub max_retries: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            state: HostState::Active,
            timeout: Duration::from_secs(120),
            max_retries: 3,
        }
    }
}

/// Client for the paginated hosts endpoint.
pub struct HostsClient {
    transport: ApiTransport,
    reporter: Arc<dyn Reporter>,
    options: FetchOptions,
    backoff_base: Duration,
    page_delay: Duration,
}

impl HostsClient {
    pub fn new(
        config: &VectraConfig,
        reporter: Arc<dyn Reporter>,
        options: FetchOptions,
    ) -> Result<Self> {
        let transport = ApiTransport::new(config, options.timeout)?;
        Ok(Self {
            transport,
            reporter,
            options,
            backoff_base: Duration::from_secs(1),
            page_delay: Duration::from_secs(1),
        })
    }

    /// Override the unit of the exponential retry backoff (default 1s, so a
    /// retry `n` sleeps `2^n` seconds). Tests shrink this to keep the retry
    /// schedule observable without the wall-clock cost.
    #[must_use]
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Override the fixed delay between successive pages (default 1s).
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Retrieve every page of hosts, returning the accumulated records in
    /// arrival order.
    ///
    /// Never fails: a page that cannot be retrieved ends the walk and the
    /// records collected so far are returned. An immediate failure on page 1
    /// yields an empty vector.
    pub async fn fetch_all(&self, access_token: &str) -> Vec<HostRecord> {
        let mut all_hosts: Vec<HostRecord> = Vec::new();
        let mut page: u32 = 1;

        let mut params: Vec<(String, String)> =
            vec![("page_size".to_string(), self.options.page_size.to_string())];
        if let Some(state) = self.options.state.as_query_param() {
            params.push(("state".to_string(), state.to_string()));
        }

        loop {
            let response = self.fetch_page_with_retries(page, &params, access_token).await;

            let Some(response) = response else {
                self.reporter.error(&format!(
                    "Failed to retrieve hosts on page {page} after {} retry attempts",
                    self.options.max_retries
                ));
                break;
            };

            let status = response.status();
            if status != StatusCode::OK {
                let body = response.text().await.unwrap_or_default();
                self.reporter.error(&format!(
                    "Failed to retrieve hosts on page {page} after {} retry attempts: {} - {body}",
                    self.options.max_retries,
                    status.as_u16(),
                ));
                break;
            }

            let host_page = match parse_page(response).await {
                Ok(host_page) => host_page,
                Err(message) => {
                    self.reporter
                        .error(&format!("Malformed hosts response on page {page}: {message}"));
                    break;
                }
            };

            let count = host_page.results.len();
            all_hosts.extend(host_page.results);
            self.reporter.success(&format!("Retrieved {count} hosts from page {page}"));

            let Some(next_url) = host_page.next.filter(|next| !next.is_empty()) else {
                break;
            };

            // Re-inject only the page number from the next-page URL.
            if let Some(cursor) = extract_page_cursor(&next_url) {
                set_param(&mut params, "page", cursor);
            } else {
                debug!(%next_url, "next URL without page parameter; keeping previous cursor");
            }

            page += 1;
            tokio::time::sleep(self.page_delay).await;
        }

        all_hosts
    }

    /// Request one page, retrying only on HTTP 504.
    ///
    /// Returns the last response obtained, or `None` when every attempt
    /// failed at the transport level.
    async fn fetch_page_with_retries(
        &self,
        page: u32,
        params: &[(String, String)],
        access_token: &str,
    ) -> Option<Response> {
        let mut response = None;

        for attempt in 0..=self.options.max_retries {
            if attempt > 0 {
                self.reporter.warning(&format!(
                    "Retry attempt {attempt}/{} for page {page}...",
                    self.options.max_retries
                ));
                tokio::time::sleep(self.backoff_base * 2u32.saturating_pow(attempt)).await;
            }

            self.reporter.info(&format!("Retrieving hosts (page {page})..."));
            match self.transport.get(HOSTS_ENDPOINT, params, access_token).await {
                Ok(resp) => {
                    let is_timeout = resp.status() == StatusCode::GATEWAY_TIMEOUT;
                    response = Some(resp);
                    // Success and non-timeout errors both end the retry loop.
                    if !is_timeout {
                        break;
                    }
                }
                Err(e) => {
                    warn!(page, attempt, error = %e, "page request failed");
                    response = None;
                }
            }
        }

        response
    }
}

async fn parse_page(response: Response) -> std::result::Result<HostPage, String> {
    let body = response.text().await.map_err(|e| e.to_string())?;
    serde_json::from_str::<HostPage>(&body).map_err(|e| e.to_string())
}

/// Pull the `page` query parameter out of a next-page URL, verbatim.
fn extract_page_cursor(next_url: &str) -> Option<String> {
    let url = Url::parse(next_url).ok()?;
    url.query_pairs().find(|(key, _)| key == "page").map(|(_, value)| value.into_owned())
}

fn set_param(params: &mut Vec<(String, String)>, key: &str, value: String) {
    if let Some(entry) = params.iter_mut().find(|(k, _)| k == key) {
        entry.1 = value;
    } else {
        params.push((key.to_string(), value));
    }
}
