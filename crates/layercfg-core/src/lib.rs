//! layercfg Core
//!
//! Layered process configuration: a flat JSON file, the process environment,
//! and an optional secret backend (Google Secret Manager or the system
//! keychain), resolved in that order.
//!
//! Lookups are synchronous. They are safe to call from inside a tokio
//! runtime, but a Secret Manager lookup blocks its thread until the reply
//! arrives.
//!
//! ```rust,no_run
//! use layercfg_core::{ConfigStore, GsmOptions};
//!
//! let config = ConfigStore::load("config.json")?;
//! config.enable_gsm("my-project", GsmOptions::default())?;
//!
//! // File first, then $DB_PASSWORD, then the DB_PASSWORD secret
//! let password = config.get("DB_PASSWORD")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod logging;
pub mod secrets;
pub mod config;
pub mod resolver;
pub mod editor;

// Re-export commonly used types
pub use config::{
    ConfigEntry, ConfigSource, ConfigStore, ConfigStoreBuilder, LoadError, ValueKind, ValueMode,
};

pub use secrets::{
    SecretStore, SecretStoreError, SecretStoreResult,
    EnvSecretStore, MemorySecretStore, KeychainSecretStore,
    GsmSecretStore, GsmOptions, TokenSource,
};

pub use logging::{Logger, LogLevel, SharedLogger, NoOpLogger, ConsoleLogger, MemoryLogger};

pub use resolver::{ConsultedSources, ResolveError, ResolvedValue, ValueSource};

pub use editor::{EditorError, EditorPreference};
