//! This module provides an in-memory sink for report-log records.
//!
//! The `MemorySink` keeps the most recent records in a bounded ring buffer.
//! It stands in for the file output wherever the sink's behaviour has to be
//! inspected without touching the filesystem.
use super::{LogRecord, LogSink, SinkError};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::Level;

/// A bounded, in-memory log sink.
pub struct MemorySink {
    /// The circular buffer of records.
    entries: Mutex<VecDeque<LogRecord>>,
    /// The maximum number of records to keep.
    max_size: usize,
}

impl MemorySink {
    /// Creates a new `MemorySink`.
    ///
    /// # Arguments
    ///
    /// * `max_size` - The maximum number of records to keep. Older records
    ///   are dropped first once the buffer is full.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(max_size.min(1024))),
            max_size,
        }
    }

    /// Returns a copy of every buffered record, oldest first.
    pub fn records(&self) -> Vec<LogRecord> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the rendered lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.records().iter().map(LogRecord::render).collect()
    }

    /// Returns the records at exactly `level`.
    pub fn at_level(&self, level: Level) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.level == level)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SinkError::Unavailable("memory sink lock poisoned".to_string()))?;
        if self.max_size == 0 {
            return Ok(());
        }
        if entries.len() >= self.max_size {
            entries.pop_front();
        }
        entries.push_back(record.clone());
        Ok(())
    }
}
