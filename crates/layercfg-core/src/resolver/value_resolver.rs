//! Precedence-ordered lookup on `ConfigStore`

use std::fmt;

use thiserror::Error;

use crate::config::ConfigStore;

/// Which layer supplied a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// The config file (or inline document)
    File,
    /// An environment variable of the same name
    Environment,
    /// The named secret backend
    SecretBackend(String),
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::File => write!(f, "file"),
            ValueSource::Environment => write!(f, "env"),
            ValueSource::SecretBackend(name) => write!(f, "secret:{}", name),
        }
    }
}

/// Result of resolving a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    pub value: String,
    pub source: ValueSource,
}

/// The sources a failed lookup went through
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConsultedSources {
    /// Display form of the loaded config source, if one was loaded
    pub config_file: Option<String>,
    pub environment: bool,
    /// Name of the secret backend, if one was enabled
    pub secret_backend: Option<String>,
}

impl fmt::Display for ConsultedSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(file) = &self.config_file {
            parts.push(format!("in config file: '{}'", file));
        }
        if self.environment {
            parts.push("as an environment variable".to_string());
        }
        if let Some(backend) = &self.secret_backend {
            parts.push(format!("in {}", backend));
        }

        match parts.as_slice() {
            [] => write!(f, "in any source"),
            [one] => write!(f, "{}", one),
            [first, second] => write!(f, "{} or {}", first, second),
            [init @ .., last] => write!(f, "{}, or {}", init.join(", "), last),
        }
    }
}

/// Errors from resolving a key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("'{key}' not set {consulted}")]
    NotFound {
        key: String,
        consulted: ConsultedSources,
    },
}

impl ResolveError {
    pub fn key(&self) -> &str {
        match self {
            ResolveError::NotFound { key, .. } => key,
        }
    }
}

impl ConfigStore {
    /// Resolve `key`, reporting which layer supplied the value
    pub fn resolve(&self, key: &str) -> Option<ResolvedValue> {
        if let Some(entry) = self.entries.get(key) {
            return Some(ResolvedValue {
                value: entry.value().to_string(),
                source: ValueSource::File,
            });
        }

        if let Some(value) = self.environment.get(key).filter(|v| !v.is_empty()) {
            return Some(ResolvedValue {
                value,
                source: ValueSource::Environment,
            });
        }

        if let Some(backend) = self.current_backend() {
            if let Some(value) = backend.get(key).filter(|v| !v.is_empty()) {
                return Some(ResolvedValue {
                    value,
                    source: ValueSource::SecretBackend(backend.name().to_string()),
                });
            }
        }

        None
    }

    /// Resolve `key` through file, environment and secret backend
    ///
    /// Never returns an empty string as a default: a key missing from every
    /// source is a `ResolveError::NotFound`.
    pub fn get(&self, key: &str) -> Result<String, ResolveError> {
        match self.resolve(key) {
            Some(resolved) => Ok(resolved.value),
            None => Err(ResolveError::NotFound {
                key: key.to_string(),
                consulted: self.consulted_sources(),
            }),
        }
    }

    /// Non-failing variant of `get`
    pub fn try_get(&self, key: &str) -> Option<String> {
        self.resolve(key).map(|r| r.value)
    }

    /// The sources a lookup goes through right now
    pub fn consulted_sources(&self) -> ConsultedSources {
        ConsultedSources {
            config_file: self.source().map(|s| s.to_string()),
            environment: true,
            secret_backend: self.secret_backend_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValueMode;
    use crate::logging::{LogLevel, Logger, MemoryLogger, NoOpLogger};
    use crate::secrets::{EnvSecretStore, MemorySecretStore, SecretStore};
    use serial_test::serial;
    use std::sync::Arc;

    struct Layers {
        env: Arc<MemorySecretStore>,
        backend: Arc<MemorySecretStore>,
    }

    fn store_with(doc: Option<&str>) -> (ConfigStore, Layers) {
        let env = Arc::new(MemorySecretStore::named("env"));
        let backend = Arc::new(MemorySecretStore::named("Google Secret Manager"));
        let mut builder = ConfigStore::builder()
            .environment(env.clone())
            .logger(Arc::new(NoOpLogger::new()));
        if let Some(doc) = doc {
            builder = builder.document(doc);
        }
        (builder.build().unwrap(), Layers { env, backend })
    }

    #[test]
    fn test_file_wins_over_env() {
        let (store, layers) = store_with(Some(r#"{"DB_HOST": "from-file"}"#));
        layers.env.insert("DB_HOST", "from-env");

        let resolved = store.resolve("DB_HOST").unwrap();
        assert_eq!(resolved.value, "from-file");
        assert_eq!(resolved.source, ValueSource::File);
    }

    #[test]
    fn test_empty_file_value_is_not_a_miss() {
        let (store, layers) = store_with(Some(r#"{"PREFIX": ""}"#));
        layers.env.insert("PREFIX", "from-env");
        store.enable_secret_backend(layers.backend.clone());
        layers.backend.insert("PREFIX", "from-secret");

        assert_eq!(store.get("PREFIX").unwrap(), "");
    }

    #[test]
    fn test_env_used_when_key_absent_from_file() {
        let (store, layers) = store_with(Some(r#"{"OTHER": "x"}"#));
        layers.env.insert("API_URL", "https://env.example.com");

        let resolved = store.resolve("API_URL").unwrap();
        assert_eq!(resolved.value, "https://env.example.com");
        assert_eq!(resolved.source, ValueSource::Environment);
    }

    #[test]
    fn test_env_used_without_file() {
        let (store, layers) = store_with(None);
        layers.env.insert("API_URL", "https://env.example.com");
        assert_eq!(store.get("API_URL").unwrap(), "https://env.example.com");
    }

    #[test]
    fn test_empty_env_falls_through_to_backend() {
        let (store, layers) = store_with(None);
        layers.env.insert("TOKEN", "");
        layers.backend.insert("TOKEN", "from-secret");
        store.enable_secret_backend(layers.backend.clone());

        let resolved = store.resolve("TOKEN").unwrap();
        assert_eq!(resolved.value, "from-secret");
        assert_eq!(
            resolved.source,
            ValueSource::SecretBackend("Google Secret Manager".to_string())
        );
    }

    #[test]
    fn test_backend_ignored_when_disabled() {
        let (store, layers) = store_with(None);
        layers.backend.insert("TOKEN", "from-secret");
        store.enable_secret_backend(layers.backend.clone());
        store.disable_secret_backend();

        assert_eq!(store.try_get("TOKEN"), None);
    }

    #[test]
    fn test_empty_backend_value_is_a_miss() {
        let (store, layers) = store_with(None);
        layers.backend.insert("TOKEN", "");
        store.enable_secret_backend(layers.backend.clone());

        assert!(store.get("TOKEN").is_err());
    }

    #[test]
    fn test_miss_names_every_source() {
        let (store, layers) = store_with(Some(r#"{}"#));
        store.enable_secret_backend(layers.backend.clone());

        let err = store.get("MISSING").unwrap_err();
        assert_eq!(err.key(), "MISSING");
        assert_eq!(
            err.to_string(),
            "'MISSING' not set in config file: '<inline>', as an environment variable, or in Google Secret Manager"
        );
    }

    #[test]
    fn test_miss_messages_per_source_set() {
        let (store, _) = store_with(None);
        assert_eq!(
            store.get("K").unwrap_err().to_string(),
            "'K' not set as an environment variable"
        );

        let (store, _) = store_with(Some("{}"));
        assert_eq!(
            store.get("K").unwrap_err().to_string(),
            "'K' not set in config file: '<inline>' or as an environment variable"
        );

        let (store, layers) = store_with(None);
        store.enable_secret_backend(layers.backend.clone());
        assert_eq!(
            store.get("K").unwrap_err().to_string(),
            "'K' not set as an environment variable or in Google Secret Manager"
        );
    }

    #[test]
    fn test_try_get_never_defaults_to_empty() {
        let (store, _) = store_with(None);
        assert_eq!(store.try_get("NOPE"), None);
    }

    #[test]
    fn test_raw_mode_values_resolve() {
        let store = ConfigStore::builder()
            .document(r#"{"a": "1", "b": "x"}"#)
            .value_mode(ValueMode::Raw)
            .environment(Arc::new(MemorySecretStore::new()))
            .logger(Arc::new(NoOpLogger::new()))
            .build()
            .unwrap();
        assert_eq!(store.get("a").unwrap(), "1");
        assert_eq!(store.get("b").unwrap(), "x");
    }

    #[test]
    fn test_failing_backend_does_not_break_resolution() {
        struct FlakyStore {
            logger: Arc<MemoryLogger>,
        }
        impl SecretStore for FlakyStore {
            fn name(&self) -> &str {
                "flaky"
            }
            fn get(&self, key: &str) -> Option<String> {
                self.logger.warn(&format!("Failed to access secret {}: timeout", key));
                None
            }
        }

        let logger = Arc::new(MemoryLogger::new());
        let (store, layers) = store_with(Some(r#"{"FROM_FILE": "ok"}"#));
        layers.env.insert("FROM_ENV", "ok");
        store.enable_secret_backend(Arc::new(FlakyStore { logger: logger.clone() }));

        assert_eq!(store.get("FROM_FILE").unwrap(), "ok");
        assert_eq!(store.get("FROM_ENV").unwrap(), "ok");
        assert!(store.get("ONLY_SECRET").is_err());
        assert!(logger.contains(LogLevel::Warn, "ONLY_SECRET"));
    }

    #[test]
    fn test_concurrent_reads() {
        let (store, layers) = store_with(Some(r#"{"A": "1"}"#));
        layers.env.insert("B", "2");
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(store.get("A").unwrap(), "1");
                        assert_eq!(store.get("B").unwrap(), "2");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    #[serial]
    fn test_process_environment_layer() {
        temp_env::with_var("LAYERCFG_RESOLVER_TEST_VAR", Some("from-process-env"), || {
            let store = ConfigStore::builder()
                .environment(Arc::new(EnvSecretStore::new()))
                .logger(Arc::new(NoOpLogger::new()))
                .build_without_file();
            assert_eq!(
                store.get("LAYERCFG_RESOLVER_TEST_VAR").unwrap(),
                "from-process-env"
            );
        });
    }

    #[test]
    fn test_value_source_display() {
        assert_eq!(ValueSource::File.to_string(), "file");
        assert_eq!(ValueSource::Environment.to_string(), "env");
        assert_eq!(
            ValueSource::SecretBackend("keychain:app".to_string()).to_string(),
            "secret:keychain:app"
        );
    }
}
