//! Token types for the Vectra identity endpoint
//!
//! [`TokenRecord`] is the persisted shape: the server's token response plus
//! the local issue time. [`TokenResponse`] is the wire shape as returned by
//! `POST {base_url}oauth2/token`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// OAuth2 bearer token with local issue metadata
///
/// A record is "usable" while `now < issued_at + expires_in` and
/// "refreshable" while a refresh token exists and
/// `now < issued_at + refresh_expires_in`. Records are replaced wholesale on
/// every successful authentication or refresh, never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Opaque bearer credential
    pub access_token: String,

    /// Refresh token, present only for grants that support renewal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Refresh token lifetime in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_expires_in: Option<i64>,

    /// Wall-clock issue time (UTC), set locally, not by the server.
    ///
    /// Serialized as `timestamp` in the persisted token file.
    #[serde(rename = "timestamp")]
    pub issued_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Absolute access-token expiry.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(self.expires_in)
    }

    /// Absolute refresh-token expiry, when a refresh lifetime was issued.
    #[must_use]
    pub fn refresh_expires_at(&self) -> Option<DateTime<Utc>> {
        self.refresh_expires_in.map(|secs| self.issued_at + Duration::seconds(secs))
    }

    /// Whether the access token is still valid at `now`.
    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }

    /// Whether the record can still be refreshed at `now`.
    #[must_use]
    pub fn is_refreshable(&self, now: DateTime<Utc>) -> bool {
        if self.refresh_token.is_none() {
            return false;
        }
        match self.refresh_expires_at() {
            Some(refresh_expiry) => now < refresh_expiry,
            None => false,
        }
    }
}

/// Token response from the identity endpoint
///
/// `access_token` and `expires_in` are required; everything else is
/// provider-optional. Deserialization failure on a 200 response surfaces as
/// a named parse error rather than a missing-field panic.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub refresh_expires_in: Option<i64>,
}

impl TokenResponse {
    /// Stamp the response with a local issue time, producing the record to
    /// persist.
    #[must_use]
    pub fn into_record(self, issued_at: DateTime<Utc>) -> TokenRecord {
        TokenRecord {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_in: self.expires_in,
            refresh_expires_in: self.refresh_expires_in,
            issued_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(expires_in: i64, refresh: Option<(&str, i64)>) -> TokenRecord {
        TokenRecord {
            access_token: "abc".to_string(),
            refresh_token: refresh.map(|(token, _)| token.to_string()),
            expires_in,
            refresh_expires_in: refresh.map(|(_, secs)| secs),
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn fresh_token_is_usable() {
        let record = record(3600, None);
        assert!(record.is_usable(Utc::now()));
    }

    #[test]
    fn token_expires_after_its_lifetime() {
        let record = record(3600, None);
        let later = record.issued_at + Duration::seconds(3601);
        assert!(!record.is_usable(later));
    }

    #[test]
    fn refreshable_only_between_expiry_and_refresh_expiry() {
        let record = record(3600, Some(("refresh", 86400)));

        let after_expiry = record.issued_at + Duration::seconds(7200);
        assert!(!record.is_usable(after_expiry));
        assert!(record.is_refreshable(after_expiry));

        let after_refresh_expiry = record.issued_at + Duration::seconds(86401);
        assert!(!record.is_refreshable(after_refresh_expiry));
    }

    #[test]
    fn not_refreshable_without_refresh_token() {
        let record = record(3600, None);
        assert!(!record.is_refreshable(Utc::now()));
    }

    #[test]
    fn not_refreshable_without_refresh_lifetime() {
        let mut record = record(3600, None);
        record.refresh_token = Some("refresh".to_string());
        assert!(!record.is_refreshable(Utc::now()));
    }

    #[test]
    fn issued_at_serializes_as_timestamp_field() {
        let record = record(3600, None);
        let json = serde_json::to_value(&record).expect("serialize");
        assert!(json.get("timestamp").is_some());
        assert!(json.get("issued_at").is_none());
        // Optional fields absent from the wire stay absent on disk.
        assert!(json.get("refresh_token").is_none());
    }

    #[test]
    fn response_with_minimal_fields_parses() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc", "expires_in": 3600}"#)
                .expect("minimal response");
        assert_eq!(response.access_token, "abc");
        assert!(response.refresh_token.is_none());
    }

    #[test]
    fn response_without_access_token_names_the_field() {
        let err = serde_json::from_str::<TokenResponse>(r#"{"expires_in": 3600}"#)
            .expect_err("access_token is required");
        assert!(err.to_string().contains("access_token"));
    }

    #[test]
    fn persisted_record_round_trips_expiry_math() {
        let original = record(3600, Some(("refresh", 86400)));
        let json = serde_json::to_string(&original).expect("serialize");
        let reloaded: TokenRecord = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(reloaded.expires_at(), original.expires_at());
        assert_eq!(reloaded.refresh_expires_at(), original.refresh_expires_at());
    }
}
