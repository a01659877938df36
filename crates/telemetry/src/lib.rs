//! # Background Mode Telemetry
//!
//! Logging setup and an in-memory journal of notable events.

pub mod logging;

use serde::{Deserialize, Serialize};

pub use logging::{LogEntry, LogLevel, Logger};

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Log level used when `RUST_LOG` is unset
    pub log_level: LogLevel,
    /// Entries kept in the in-memory journal
    pub journal_capacity: usize,
    /// Include thread ids in formatted output
    pub thread_ids: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            journal_capacity: 256,
            thread_ids: false,
        }
    }
}
