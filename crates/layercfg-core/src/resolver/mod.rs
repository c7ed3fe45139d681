//! Value resolution across the config file, environment and secret backend
//!
//! Sources are consulted in a fixed order and the first usable value wins:
//! 1. Config file (presence wins, even for `""`)
//! 2. Environment variable of the same name (non-empty)
//! 3. Secret backend, if enabled (non-empty)

mod value_resolver;

pub use value_resolver::{ConsultedSources, ResolveError, ResolvedValue, ValueSource};
