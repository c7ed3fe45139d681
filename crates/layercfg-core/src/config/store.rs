//! The configuration store

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use super::entry::{ConfigEntry, ValueMode};
use super::error::LoadError;
use super::loader;
use crate::logging::{ConsoleLogger, SharedLogger};
use crate::{log_debug, log_info};
use crate::secrets::{
    EnvSecretStore, GsmOptions, GsmSecretStore, KeychainSecretStore, SecretStore,
    SecretStoreError, SecretStoreResult,
};

/// Where the file layer of a store came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Inline,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Inline => write!(f, "<inline>"),
        }
    }
}

/// Layered configuration: JSON file, then environment, then secret backend
///
/// The file layer is fixed at construction. Only the secret backend slot
/// can change afterwards, so lookups are safe from any number of threads.
///
/// # Example
///
/// ```no_run
/// use layercfg_core::ConfigStore;
///
/// let config = ConfigStore::load("/etc/myapp/config.json")?;
/// let db_host = config.get("DB_HOST")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ConfigStore {
    pub(crate) entries: BTreeMap<String, ConfigEntry>,
    pub(crate) source: Option<ConfigSource>,
    pub(crate) mode: ValueMode,
    pub(crate) environment: Arc<dyn SecretStore>,
    pub(crate) backend: RwLock<Option<Arc<dyn SecretStore>>>,
    pub(crate) logger: SharedLogger,
}

impl ConfigStore {
    pub fn builder() -> ConfigStoreBuilder {
        ConfigStoreBuilder::default()
    }

    /// Load `path` with default settings
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, LoadError> {
        Self::builder().config_file(path).build()
    }

    /// A store with no file layer: lookups go to the environment (and a
    /// secret backend, once enabled)
    pub fn without_file() -> Self {
        Self::builder().build_without_file()
    }

    /// Whether a config document was parsed
    pub fn loaded(&self) -> bool {
        self.source.is_some()
    }

    pub fn source(&self) -> Option<&ConfigSource> {
        self.source.as_ref()
    }

    /// Path of the loaded config file, if the file layer came from disk
    pub fn source_path(&self) -> Option<&Path> {
        match &self.source {
            Some(ConfigSource::File(path)) => Some(path),
            _ => None,
        }
    }

    pub fn value_mode(&self) -> ValueMode {
        self.mode
    }

    /// Entry recorded in the file layer for `key`
    pub fn entry(&self, key: &str) -> Option<&ConfigEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// File-layer entries in key order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ConfigEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn logger(&self) -> &SharedLogger {
        &self.logger
    }

    // ==================== SECRET BACKEND ====================

    /// Make `backend` the active secret backend
    ///
    /// Only one backend is active at a time; the previous one, if any, is
    /// returned.
    pub fn enable_secret_backend(
        &self,
        backend: Arc<dyn SecretStore>,
    ) -> Option<Arc<dyn SecretStore>> {
        log_info!(self.logger, "Secret backend enabled: {}", backend.name());
        self.backend.write().replace(backend)
    }

    /// Like `enable_secret_backend`, but refuses a backend that reports
    /// itself unavailable and leaves the current one in place
    pub fn try_enable_secret_backend(
        &self,
        backend: Arc<dyn SecretStore>,
    ) -> SecretStoreResult<Option<Arc<dyn SecretStore>>> {
        if !backend.is_available() {
            return Err(SecretStoreError::NotAvailable(format!(
                "{} cannot be reached",
                backend.name()
            )));
        }
        Ok(self.enable_secret_backend(backend))
    }

    /// Connect to Google Secret Manager for `project_id` and make it the
    /// active backend
    ///
    /// The connection logs through this store's logger. Its HTTP calls run
    /// on a thread of their own, so `get` may be called from async code; the
    /// caller blocks while a request is in flight.
    pub fn enable_gsm(&self, project_id: &str, options: GsmOptions) -> SecretStoreResult<()> {
        let store = GsmSecretStore::connect(project_id, options.with_logger(self.logger.clone()))?;
        self.enable_secret_backend(Arc::new(store));
        Ok(())
    }

    /// Use the system keychain, scoped to `service`, as the active backend
    ///
    /// Fails with `NotAvailable` when no keychain can be reached.
    pub fn enable_keychain(&self, service: &str) -> SecretStoreResult<()> {
        let store = KeychainSecretStore::with_service(service)?.with_logger(self.logger.clone());
        self.try_enable_secret_backend(Arc::new(store))?;
        Ok(())
    }

    /// Deactivate the secret backend; a no-op when none is active
    ///
    /// Returns whether a backend was active.
    pub fn disable_secret_backend(&self) -> bool {
        match self.backend.write().take() {
            Some(backend) => {
                log_info!(self.logger, "Secret backend disabled: {}", backend.name());
                true
            }
            None => false,
        }
    }

    /// Release the backend handle before exit
    pub fn cleanup(&self) {
        if let Some(backend) = self.backend.write().take() {
            log_debug!(self.logger, "Released secret backend: {}", backend.name());
        }
    }

    pub fn secret_backend_enabled(&self) -> bool {
        self.backend.read().is_some()
    }

    pub fn secret_backend_name(&self) -> Option<String> {
        self.backend.read().as_ref().map(|b| b.name().to_string())
    }

    /// Current backend, cloned out so the lock is not held across a lookup
    pub(crate) fn current_backend(&self) -> Option<Arc<dyn SecretStore>> {
        self.backend.read().clone()
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("source", &self.source)
            .field("entries", &format!("[{} keys]", self.entries.len()))
            .field("mode", &self.mode)
            .field("environment", &self.environment.name())
            .field("secret_backend", &self.secret_backend_name())
            .finish()
    }
}

/// Builder for `ConfigStore`
#[derive(Default)]
pub struct ConfigStoreBuilder {
    path: Option<PathBuf>,
    document: Option<String>,
    mode: ValueMode,
    environment: Option<Arc<dyn SecretStore>>,
    backend: Option<Arc<dyn SecretStore>>,
    logger: Option<SharedLogger>,
}

impl ConfigStoreBuilder {
    /// Load the file layer from `path`
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Like `config_file`, but `None` means no file layer
    pub fn config_file_opt(mut self, path: Option<PathBuf>) -> Self {
        self.path = path;
        self
    }

    /// Use an in-memory JSON document as the file layer
    ///
    /// Takes precedence over `config_file`.
    pub fn document(mut self, json: impl Into<String>) -> Self {
        self.document = Some(json.into());
        self
    }

    pub fn value_mode(mut self, mode: ValueMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the environment layer (defaults to `EnvSecretStore`)
    pub fn environment(mut self, environment: Arc<dyn SecretStore>) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn secret_backend(mut self, backend: Arc<dyn SecretStore>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(self) -> Result<ConfigStore, LoadError> {
        let logger = self.logger.clone().unwrap_or_else(|| Arc::new(ConsoleLogger::new()));

        let (entries, source) = if let Some(document) = &self.document {
            let entries = loader::parse_document(document, self.mode).map_err(LoadError::Inline)?;
            (entries, Some(ConfigSource::Inline))
        } else if let Some(path) = &self.path {
            let entries = loader::load_file(path, self.mode)?;
            (entries, Some(ConfigSource::File(path.clone())))
        } else {
            logger.debug("No config file given; resolving from environment and secret backend only");
            (BTreeMap::new(), None)
        };

        if let Some(source) = &source {
            log_debug!(logger, "Loaded {} keys from {}", entries.len(), source);
        }

        Ok(self.assemble(entries, source, logger))
    }

    /// Build a store without a file layer, ignoring any path or document
    pub fn build_without_file(self) -> ConfigStore {
        let logger = self.logger.clone().unwrap_or_else(|| Arc::new(ConsoleLogger::new()));
        self.assemble(BTreeMap::new(), None, logger)
    }

    fn assemble(
        self,
        entries: BTreeMap<String, ConfigEntry>,
        source: Option<ConfigSource>,
        logger: SharedLogger,
    ) -> ConfigStore {
        ConfigStore {
            entries,
            source,
            mode: self.mode,
            environment: self.environment.unwrap_or_else(|| Arc::new(EnvSecretStore::new())),
            backend: RwLock::new(self.backend),
            logger,
        }
    }
}
