//! OAuth2 client-credentials lifecycle
//!
//! This module owns the full authentication lifecycle against the Vectra
//! identity endpoint:
//! - Token acquisition (client-credentials grant)
//! - Local persistence across process invocations
//! - Expiry detection and refresh (refresh-token grant)
//!
//! The pieces are wired together by [`TokenManager`], which is generic over
//! an [`IdentityClient`] and a [`TokenStore`] so both can be substituted in
//! tests.

pub mod client;
pub mod manager;
pub mod store;
pub mod types;

// Re-export commonly used items
pub use client::{AuthError, IdentityClient, OAuth2Client};
pub use manager::TokenManager;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
pub use types::{TokenRecord, TokenResponse};
