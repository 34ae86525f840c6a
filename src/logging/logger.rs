//! The leveled report logger that fans records out to its sinks.
use super::{LogRecord, LogSink};
use std::sync::Arc;
use tracing::Level;

/// A leveled logger writing every accepted record to all of its sinks.
///
/// A failing sink never stops the others; its fault is reported on the
/// diagnostic stream (stderr) and the record is still delivered elsewhere.
#[derive(Clone)]
pub struct Logger {
    threshold: Level,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl Logger {
    /// Creates a logger accepting records at `threshold` or more severe.
    pub fn new(threshold: Level) -> Self {
        Self {
            threshold,
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn threshold(&self) -> Level {
        self.threshold
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }

    /// Returns whether a record at `level` would be recorded.
    pub fn enabled(&self, level: Level) -> bool {
        // `tracing::Level` orders more verbose levels as greater.
        level <= self.threshold
    }

    /// Records `message` at `level` if it passes the threshold.
    pub fn log(&self, level: Level, message: impl Into<String>) {
        if !self.enabled(level) {
            return;
        }
        let record = LogRecord::now(level, message);
        for sink in &self.sinks {
            if let Err(e) = sink.write(&record) {
                tracing::warn!(sink = sink.name(), error = %e, "Failed to write log record");
            }
        }
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::DEBUG, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::INFO, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::WARN, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::ERROR, message);
    }
}
