//! Core traits and types for secret lookup

use thiserror::Error;

/// Errors that can occur while establishing a secret store
///
/// Lookups never surface these: a failed `get` is logged by the store and
/// reported as a miss so the resolver can keep falling back.
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Invalid store identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Store not available: {0}")]
    NotAvailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode secret payload: {0}")]
    Decode(String),

    #[error("Store error: {0}")]
    Other(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Trait for read-only secret lookups
///
/// Implementations:
/// - Environment variables (`EnvSecretStore`)
/// - In-memory (`MemorySecretStore`)
/// - Google Secret Manager (`GsmSecretStore`)
/// - System keychain (`KeychainSecretStore`)
///
/// # Example
///
/// ```
/// use layercfg_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.insert("DB_PASSWORD", "hunter2");
/// assert_eq!(store.get("DB_PASSWORD"), Some("hunter2".to_string()));
/// ```
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store, used in diagnostics
    fn name(&self) -> &str;

    /// Check if this store is available
    ///
    /// For example, a keychain store might not be available on a headless server.
    fn is_available(&self) -> bool {
        true
    }

    /// Retrieve a secret by key
    ///
    /// Returns `None` when the key is unknown or the lookup failed.
    fn get(&self, key: &str) -> Option<String>;

    /// Check if a secret exists
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
