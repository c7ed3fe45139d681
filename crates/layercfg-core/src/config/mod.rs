//! The file layer and the store that owns it
//!
//! - `ConfigStore`: file entries plus the environment and secret backend layers
//! - `loader`: JSON parsing and value normalization
//! - `ConfigEntry` / `ValueKind` / `ValueMode`: what gets stored and how

mod entry;
mod error;
pub mod loader;
mod store;

pub use entry::{ConfigEntry, ValueKind, ValueMode};
pub use error::LoadError;
pub use store::{ConfigSource, ConfigStore, ConfigStoreBuilder};
