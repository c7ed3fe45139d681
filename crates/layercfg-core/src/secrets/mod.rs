//! Secret lookup abstractions and implementations
//!
//! This module provides the sources layered under the config file:
//! - `SecretStore` trait for implementing custom stores
//! - `EnvSecretStore` for the environment layer
//! - `GsmSecretStore` and `KeychainSecretStore` as remote/OS secret backends
//! - `MemorySecretStore` for tests and embedding

mod traits;
mod env_store;
mod memory_store;
mod keychain_store;
mod gsm_store;

pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
pub use keychain_store::KeychainSecretStore;
pub use gsm_store::{
    GsmOptions, GsmSecretStore, TokenSource, ACCESS_TOKEN_ENV, DEFAULT_GSM_ENDPOINT,
    DEFAULT_GSM_TIMEOUT, DEFAULT_METADATA_TOKEN_URL,
};
