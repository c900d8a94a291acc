//! Durable token cache
//!
//! The persisted token file is a plain JSON rendering of [`TokenRecord`],
//! overwritten wholesale on every save. No file locking is attempted;
//! concurrent processes racing to refresh the same file is an accepted
//! limitation (last writer wins).

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::types::TokenRecord;

/// Error type for token store operations
#[derive(Debug)]
pub enum TokenStoreError {
    /// Filesystem read/write failed
    Io(String),

    /// Stored content could not be parsed back into a record
    Malformed(String),
}

impl std::fmt::Display for TokenStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "token store I/O error: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed token cache: {msg}"),
        }
    }
}

impl std::error::Error for TokenStoreError {}

/// Persistence seam for [`TokenRecord`]s
///
/// Abstracting the store keeps the token manager independent of where
/// tokens live, so an in-memory or encrypted backend can be swapped in
/// without touching the lifecycle logic.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the cached record, `Ok(None)` when nothing has been persisted.
    async fn load(&self) -> Result<Option<TokenRecord>, TokenStoreError>;

    /// Persist the record, replacing any previous content.
    async fn save(&self, record: &TokenRecord) -> Result<(), TokenStoreError>;
}

// Allow shared handles to be used anywhere a `TokenStore` is required.
#[async_trait]
impl<T: TokenStore + ?Sized> TokenStore for std::sync::Arc<T> {
    async fn load(&self) -> Result<Option<TokenRecord>, TokenStoreError> {
        (**self).load().await
    }

    async fn save(&self, record: &TokenRecord) -> Result<(), TokenStoreError> {
        (**self).save(record).await
    }
}

/// File-backed token store (`vectra_token.json` by convention)
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<TokenRecord>, TokenStoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| TokenStoreError::Io(e.to_string()))?;
        let record = serde_json::from_str(&raw)
            .map_err(|e| TokenStoreError::Malformed(e.to_string()))?;
        Ok(Some(record))
    }

    async fn save(&self, record: &TokenRecord) -> Result<(), TokenStoreError> {
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| TokenStoreError::Malformed(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| TokenStoreError::Io(e.to_string()))
    }
}

/// In-memory token store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    record: Mutex<Option<TokenRecord>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing record.
    #[must_use]
    pub fn with_record(record: TokenRecord) -> Self {
        Self { record: Mutex::new(Some(record)) }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<TokenRecord>, TokenStoreError> {
        let guard =
            self.record.lock().map_err(|_| TokenStoreError::Io("poisoned lock".to_string()))?;
        Ok(guard.clone())
    }

    async fn save(&self, record: &TokenRecord) -> Result<(), TokenStoreError> {
        let mut guard =
            self.record.lock().map_err(|_| TokenStoreError::Io("poisoned lock".to_string()))?;
        *guard = Some(record.clone());
        Ok(())
    }
}
