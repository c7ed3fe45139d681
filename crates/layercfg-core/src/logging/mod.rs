//! Logging abstractions for runtime-agnostic logging

mod traits;
mod noop;
mod console;
mod memory;

pub use traits::{Logger, LogLevel, SharedLogger};
pub use noop::NoOpLogger;
pub use console::{ConsoleLogger, LOG_LEVEL_ENV};
pub use memory::{MemoryLogger, LogRecord};
