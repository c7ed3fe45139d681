//! In-memory secret store

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::SecretStore;

/// In-memory secret store for testing and embedding
///
/// Stands in for the environment or a remote backend when a caller wants
/// fully deterministic lookups. Safe to share between threads.
///
/// # Example
///
/// ```
/// use layercfg_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::named("fake-gsm");
/// store.insert("API_TOKEN", "t0k3n");
/// assert_eq!(store.get("API_TOKEN"), Some("t0k3n".to_string()));
/// ```
#[derive(Debug)]
pub struct MemorySecretStore {
    name: String,
    secrets: RwLock<HashMap<String, String>>,
}

impl Default for MemorySecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::named("memory")
    }

    /// Create an empty store reporting `name` in diagnostics
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secrets: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store with initial values
    pub fn with_secrets<I, K, V>(initial: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut secrets = store.secrets.write();
            for (k, v) in initial {
                secrets.insert(k.into(), v.into());
            }
        }
        store
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.secrets.write().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.secrets.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<String> {
        self.secrets.read().get(key).cloned()
    }
}
