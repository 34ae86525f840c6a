//! This module defines the structure for a single report-log record.
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::Level;

/// A single timestamped, leveled line of the report log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// The timestamp when the record was created.
    pub timestamp: DateTime<Utc>,
    /// The severity of the record.
    pub level: Level,
    /// The message content. Never contains a line break once rendered.
    pub message: String,
}

impl LogRecord {
    /// Creates a record stamped with the current time.
    pub fn now(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }

    /// Renders the record as `<timestamp> [<LEVEL>]: <message>`, without a
    /// trailing newline.
    ///
    /// Line breaks inside the message are escaped so one record always
    /// occupies exactly one line of the log file.
    pub fn render(&self) -> String {
        format!(
            "{} [{}]: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.level,
            escape_newlines(&self.message)
        )
    }
}

fn escape_newlines(message: &str) -> String {
    if !message.contains(['\n', '\r']) {
        return message.to_string();
    }
    message.replace('\r', "\\r").replace('\n', "\\n")
}
