//! Logging subsystem

use std::collections::VecDeque;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    EnvFilter,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::TelemetryConfig;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err("Invalid log level"),
        }
    }
}

/// Logger
///
/// Installs the global `tracing` subscriber and keeps a bounded journal
/// of entries recorded through [`Logger::log`].
pub struct Logger {
    /// Minimum level kept in the journal
    level: LogLevel,
    /// In-memory log journal
    buffer: RwLock<VecDeque<LogEntry>>,
    /// Journal capacity
    buffer_capacity: usize,
}

impl Logger {
    pub fn new(level: LogLevel, capacity: usize) -> Self {
        Self {
            level,
            buffer: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            buffer_capacity: capacity.max(1),
        }
    }

    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self::new(config.log_level, config.journal_capacity)
    }

    /// Initialize logging
    pub fn init(&self, config: &TelemetryConfig) -> anyhow::Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(config.thread_ids));

        // A host may already have installed its own subscriber.
        if subscriber.try_init().is_err() {
            tracing::debug!("Global subscriber already set");
        }

        Ok(())
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Record an entry. Entries below the current level are dropped.
    pub fn log(&self, entry: LogEntry) {
        if entry.level < self.level {
            return;
        }

        let mut buffer = self.buffer.write();
        if buffer.len() >= self.buffer_capacity {
            buffer.pop_front();
        }
        buffer.push_back(entry);
    }

    /// Get recent log entries, newest first
    pub fn recent(&self, count: usize) -> Vec<LogEntry> {
        let buffer = self.buffer.read();
        buffer.iter().rev().take(count).cloned().collect()
    }

    /// Number of journaled entries
    pub fn len(&self) -> usize {
        self.buffer.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.read().is_empty()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::from_config(&TelemetryConfig::default())
    }
}

/// Log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Message
    pub message: String,
    /// Target (module path)
    pub target: Option<String>,
    /// Timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Additional fields
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            target: None,
            timestamp: chrono::Utc::now(),
            fields: serde_json::Map::new(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, message)
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_journal_is_bounded() {
        let logger = Logger::new(LogLevel::Trace, 2);
        logger.log(LogEntry::info("one"));
        logger.log(LogEntry::info("two"));
        logger.log(LogEntry::info("three"));

        let recent: Vec<_> = logger.recent(10).into_iter().map(|e| e.message).collect();
        assert_eq!(recent, ["three", "two"]);
    }

    #[test]
    fn test_level_filters_entries() {
        let logger = Logger::new(LogLevel::Warn, 16);
        logger.log(LogEntry::debug("noise"));
        logger.log(LogEntry::warn("wake lock denied").with_field("step", "acquire_wake_lock"));
        logger.log(LogEntry::error("post failed"));

        assert_eq!(logger.level(), LogLevel::Warn);
        assert_eq!(logger.len(), 2);
        let recent = logger.recent(2);
        assert_eq!(recent[0].level, LogLevel::Error);
        assert_eq!(recent[1].fields["step"], "acquire_wake_lock");
    }
}
