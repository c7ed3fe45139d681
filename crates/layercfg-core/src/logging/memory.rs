//! Capturing logger for tests and embedders that surface logs themselves

use parking_lot::Mutex;

use super::traits::{LogLevel, Logger};

/// A single captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Logger that keeps every record in memory
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Whether any record at `level` contains `needle`
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.records.lock().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_captures() {
        let logger = MemoryLogger::new();
        logger.info("loaded 3 keys");
        logger.warn("backend unreachable");

        assert_eq!(logger.records().len(), 2);
        assert!(logger.contains(LogLevel::Warn, "unreachable"));
        assert!(!logger.contains(LogLevel::Error, "unreachable"));

        logger.clear();
        assert!(logger.records().is_empty());
    }

    #[test]
    fn test_logging_macros_format() {
        let logger = MemoryLogger::new();
        crate::log_warn!(logger, "retrying {} in {}s", "fetch", 2);
        crate::log_error!(logger, "giving up after {} attempts", 3);

        let records = logger.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, LogLevel::Warn);
        assert_eq!(records[0].message, "retrying fetch in 2s");
        assert_eq!(records[1].level, LogLevel::Error);
        assert_eq!(records[1].message, "giving up after 3 attempts");
    }
}
