//! Console logger implementation

use once_cell::sync::Lazy;

use super::traits::{LogLevel, Logger};

/// Environment variable holding the minimum level for `ConsoleLogger::new()`
pub const LOG_LEVEL_ENV: &str = "LAYERCFG_LOG_LEVEL";

static ENV_LEVEL: Lazy<LogLevel> = Lazy::new(|| {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|v| LogLevel::parse(&v))
        .unwrap_or(LogLevel::Info)
});

/// A logger that writes to stderr
///
/// Everything goes to stderr so that stdout stays reserved for resolved
/// values and `--print_config` output.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// Create a console logger with the default prefix and the level taken
    /// from `LAYERCFG_LOG_LEVEL` (falls back to `info`)
    pub fn new() -> Self {
        Self {
            prefix: "[layercfg]".to_string(),
            min_level: *ENV_LEVEL,
        }
    }

    /// Create a console logger with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::new()
        }
    }

    /// Override the minimum level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    fn emit(&self, level: LogLevel, message: &str) {
        if level >= self.min_level {
            eprintln!("{} {}: {}", self.prefix, level, message);
        }
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        self.emit(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.emit(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.emit(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_logger_creation() {
        let logger = ConsoleLogger::new();
        assert_eq!(logger.prefix, "[layercfg]");

        let custom = ConsoleLogger::with_prefix("[MyApp]").with_level(LogLevel::Error);
        assert_eq!(custom.prefix, "[MyApp]");
        assert_eq!(custom.min_level(), LogLevel::Error);
    }

    #[test]
    fn test_console_logger_logs() {
        // This test just verifies the logger doesn't panic
        let logger = ConsoleLogger::new().with_level(LogLevel::Debug);
        logger.debug("debug message");
        logger.info("info message");
        logger.warn("warn message");
        logger.error("error message");
    }
}
