//! Token lifecycle manager
//!
//! Decides, per invocation, whether to reuse a cached token, refresh it, or
//! authenticate from scratch:
//! 1. Cached and usable: return it with no network call.
//! 2. Cached, expired, but refreshable: refresh exactly once. A refresh
//!    failure is returned as-is; it does not cascade into a fresh
//!    client-credentials grant.
//! 3. Otherwise: full authentication.
//!
//! Every successful acquisition or refresh stamps `issued_at = now` and
//! replaces the persisted record wholesale. Cache read failures downgrade to
//! "no cached token" with a warning and are never surfaced to the caller.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::client::{AuthError, IdentityClient};
use super::store::TokenStore;
use super::types::TokenRecord;
use crate::reporter::Reporter;

/// Owns the authentication lifecycle across process invocations.
pub struct TokenManager<C, S>
where
    C: IdentityClient,
    S: TokenStore,
{
    identity: C,
    store: S,
    reporter: Arc<dyn Reporter>,
}

impl<C, S> TokenManager<C, S>
where
    C: IdentityClient,
    S: TokenStore,
{
    pub fn new(identity: C, store: S, reporter: Arc<dyn Reporter>) -> Self {
        Self { identity, store, reporter }
    }

    /// Produce a usable token, preferring cache, then refresh, then a new
    /// client-credentials grant.
    ///
    /// # Errors
    /// Returns the identity endpoint failure (status + body, or transport
    /// error) for whichever grant was attempted.
    pub async fn obtain_token(&self, force_new: bool) -> Result<TokenRecord, AuthError> {
        if !force_new {
            match self.store.load().await {
                Ok(Some(record)) => {
                    let now = Utc::now();
                    if record.is_usable(now) {
                        self.reporter.info(&format!(
                            "Using existing token (expires at {} UTC)",
                            record.expires_at().format("%Y-%m-%d %H:%M:%S")
                        ));
                        return Ok(record);
                    }
                    if record.is_refreshable(now) {
                        self.reporter
                            .info("Access token expired. Using refresh token to get a new one...");
                        let refresh_token =
                            record.refresh_token.as_deref().ok_or(AuthError::NoRefreshToken)?;
                        return self.refresh(refresh_token).await;
                    }
                    debug!("cached token expired and not refreshable");
                }
                Ok(None) => debug!("no cached token"),
                Err(e) => {
                    // Corrupt cache is not fatal; fall through to a new grant.
                    self.reporter.warning(&format!("Error reading saved token: {e}"));
                }
            }
        }

        self.authenticate().await
    }

    /// Full client-credentials authentication.
    async fn authenticate(&self) -> Result<TokenRecord, AuthError> {
        self.reporter.info("Authenticating to the Vectra API...");

        let response = match self.identity.request_token().await {
            Ok(response) => response,
            Err(e) => {
                self.reporter.error(&format!("Authentication failed: {e}"));
                return Err(e);
            }
        };

        let record = response.into_record(Utc::now());
        self.persist(&record).await;
        self.reporter.success("Authentication successful");
        Ok(record)
    }

    /// Exchange a refresh token for a new record and persist it.
    ///
    /// The new record replaces the old one in full, even when fields present
    /// before (such as the refresh lifetime) are absent from the response.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenRecord, AuthError> {
        self.reporter.info("Refreshing access token...");

        let response = match self.identity.refresh_token(refresh_token).await {
            Ok(response) => response,
            Err(e) => {
                self.reporter.error(&format!("Token refresh failed: {e}"));
                return Err(e);
            }
        };

        let record = response.into_record(Utc::now());
        self.persist(&record).await;
        self.reporter.success("Token refresh successful");
        Ok(record)
    }

    /// Persist after success; a write failure keeps the in-memory token.
    async fn persist(&self, record: &TokenRecord) {
        if let Err(e) = self.store.save(record).await {
            warn!(error = %e, "failed to persist token");
            self.reporter.warning(&format!("Could not save token for reuse: {e}"));
        }
    }
}
