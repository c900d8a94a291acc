//! Identity endpoint client
//!
//! Speaks the two grants the Vectra identity endpoint supports:
//! client-credentials (initial authentication) and refresh-token. Both are
//! form POSTs to `{base_url}oauth2/token` authenticated with an HTTP Basic
//! credential built from `client_id:client_secret`. No retry happens at this
//! layer.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use tracing::debug;
use vectra_domain::VectraConfig;

use super::types::TokenResponse;

/// Error type for identity endpoint operations
#[derive(Debug)]
pub enum AuthError {
    /// Identity endpoint answered with a non-200 status
    Status { status: u16, body: String },

    /// Request never produced a response
    Transport(String),

    /// 200 response whose body was not a valid token response
    Parse(String),

    /// Cached record has no refresh token to present
    NoRefreshToken,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { status, body } => {
                write!(f, "identity endpoint returned status {status}: {body}")
            }
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Parse(msg) => write!(f, "invalid token response: {msg}"),
            Self::NoRefreshToken => write!(f, "no refresh token available"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Trait for identity endpoint grants
///
/// Abstracts the identity endpoint so the token manager can be exercised
/// with mock implementations.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Request a brand-new token via the client-credentials grant.
    async fn request_token(&self) -> Result<TokenResponse, AuthError>;

    /// Exchange a refresh token for a new token via the refresh-token grant.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AuthError>;
}

// Allow shared handles to be used anywhere an `IdentityClient` is required.
#[async_trait]
impl<T: IdentityClient + ?Sized> IdentityClient for std::sync::Arc<T> {
    async fn request_token(&self) -> Result<TokenResponse, AuthError> {
        (**self).request_token().await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        (**self).refresh_token(refresh_token).await
    }
}

/// OAuth2 client for the Vectra identity endpoint
#[derive(Debug, Clone)]
pub struct OAuth2Client {
    config: VectraConfig,
    http: Client,
}

impl OAuth2Client {
    /// Create a client with an explicit per-request timeout.
    pub fn new(config: VectraConfig, timeout: Duration) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(Self { config, http })
    }

    fn token_url(&self) -> String {
        self.config.endpoint_url("oauth2/token")
    }

    /// Standard base64 of the `id:secret` pair for the Basic scheme.
    fn basic_credential(&self) -> String {
        BASE64.encode(format!("{}:{}", self.config.client_id, self.config.client_secret))
    }

    async fn post_grant(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let url = self.token_url();
        debug!(%url, grant = form[0].1, "requesting token");

        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Basic {}", self.basic_credential()))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Status { status: status.as_u16(), body });
        }

        // Parse from text so a missing field surfaces with its name.
        let body = response.text().await.map_err(|e| AuthError::Transport(e.to_string()))?;
        serde_json::from_str::<TokenResponse>(&body).map_err(|e| AuthError::Parse(e.to_string()))
    }
}

#[async_trait]
impl IdentityClient for OAuth2Client {
    async fn request_token(&self) -> Result<TokenResponse, AuthError> {
        self.post_grant(&[("grant_type", "client_credentials")]).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::NoRefreshToken);
        }
        self.post_grant(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> OAuth2Client {
        let config = VectraConfig::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            server.uri(),
        );
        OAuth2Client::new(config, Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn client_credentials_grant_sends_basic_auth() {
        let server = MockServer::start().await;
        // base64("client-id:client-secret")
        let expected = format!("Basic {}", BASE64.encode("client-id:client-secret"));
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(header("authorization", expected.as_str()))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "abc",
                "expires_in": 3600,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server).request_token().await.expect("token");
        assert_eq!(response.access_token, "abc");
        assert_eq!(response.expires_in, 3600);
    }

    #[tokio::test]
    async fn refresh_grant_carries_the_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=old-refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "expires_in": 3600,
                "refresh_token": "new-refresh",
                "refresh_expires_in": 86400,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response =
            client_for(&server).refresh_token("old-refresh").await.expect("refreshed");
        assert_eq!(response.access_token, "fresh");
        assert_eq!(response.refresh_token.as_deref(), Some("new-refresh"));
    }

    #[tokio::test]
    async fn non_200_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let err = client_for(&server).request_token().await.expect_err("rejected");
        match err {
            AuthError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid_client");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_required_field_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"expires_in": 3600})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).request_token().await.expect_err("unparseable");
        match err {
            AuthError::Parse(msg) => assert!(msg.contains("access_token")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_refresh_token_short_circuits() {
        let server = MockServer::start().await;
        let err = client_for(&server).refresh_token("").await.expect_err("no token");
        assert!(matches!(err, AuthError::NoRefreshToken));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
