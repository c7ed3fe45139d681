//! System keychain secret store
//!
//! Uses the OS keychain for secret lookups:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use std::sync::Arc;

use keyring::Entry;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::{log_debug, log_warn};

/// Secret store backed by the system keychain
///
/// The service name is the namespace identifier: a lookup for key `DB_URL`
/// with service `billing` reads the keychain entry `billing:DB_URL`.
///
/// # Example
///
/// ```no_run
/// use layercfg_core::secrets::{KeychainSecretStore, SecretStore};
///
/// let store = KeychainSecretStore::with_service("billing").unwrap();
/// let db_url = store.get("DB_URL");
/// ```
pub struct KeychainSecretStore {
    service_name: String,
    name: String,
    logger: SharedLogger,
}

impl KeychainSecretStore {
    /// Create a keychain store scoped to `service`
    ///
    /// Fails if the service name is empty.
    pub fn with_service(service: impl Into<String>) -> SecretStoreResult<Self> {
        let service_name = service.into();
        if service_name.trim().is_empty() {
            return Err(SecretStoreError::InvalidIdentifier(
                "keychain service name cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            name: format!("keychain:{}", service_name),
            service_name,
            logger: Arc::new(NoOpLogger::new()),
        })
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> SecretStoreResult<Entry> {
        Entry::new(&self.service_name, key)
            .map_err(|e| SecretStoreError::Other(format!("Failed to create keychain entry: {}", e)))
    }
}

impl SecretStore for KeychainSecretStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        // Fails on headless servers without a keychain daemon. A missing
        // entry still proves the keychain answered.
        let probe = Entry::new(&self.service_name, "__layercfg_availability_check__")
            .and_then(|entry| entry.get_password());
        match probe {
            Ok(_) | Err(keyring::Error::NoEntry) => true,
            Err(e) => {
                log_warn!(self.logger, "Keychain unavailable for service '{}': {}", self.service_name, e);
                false
            }
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        let entry = match self.entry(key) {
            Ok(entry) => entry,
            Err(e) => {
                log_warn!(self.logger, "Keychain lookup for '{}' failed: {}", key, e);
                return None;
            }
        };
        match entry.get_password() {
            Ok(password) => Some(password),
            Err(keyring::Error::NoEntry) => {
                log_debug!(self.logger, "Keychain has no entry for '{}'", key);
                None
            }
            Err(e) => {
                log_warn!(self.logger, "Keychain lookup for '{}' failed: {}", key, e);
                None
            }
        }
    }
}

impl std::fmt::Debug for KeychainSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeychainSecretStore")
            .field("service_name", &self.service_name)
            .finish()
    }
}
