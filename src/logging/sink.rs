//! The `LogSink` capability and the console implementation.
use super::LogRecord;
use colored::{ColoredString, Colorize};
use std::io::{self, Write};
use thiserror::Error;
use tracing::Level;

/// Errors raised by a sink while persisting a record.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Something that accepts rendered report-log records.
///
/// Implementations must append each record as one whole line: concurrent
/// callers may never observe interleaved partial lines.
pub trait LogSink: Send + Sync {
    /// Short name used in diagnostics when the sink fails.
    fn name(&self) -> &'static str;

    fn write(&self, record: &LogRecord) -> Result<(), SinkError>;
}

/// Mirrors records to stdout.
pub struct ConsoleSink {
    color: bool,
}

impl ConsoleSink {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn line(&self, record: &LogRecord) -> String {
        if !self.color {
            return record.render();
        }
        let rendered = record.render();
        let tag = format!("[{}]", record.level);
        rendered.replacen(&tag, &paint(&tag, record.level).to_string(), 1)
    }
}

fn paint(tag: &str, level: Level) -> ColoredString {
    match level {
        Level::ERROR => tag.red().bold(),
        Level::WARN => tag.yellow(),
        Level::INFO => tag.green(),
        _ => tag.dimmed(),
    }
}

impl LogSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut line = self.line(record);
        line.push('\n');

        // One write_all under the stdout lock keeps the line whole.
        let mut stdout = io::stdout().lock();
        stdout.write_all(line.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_console_line_matches_render() {
        let sink = ConsoleSink::new(false);
        let record = LogRecord::now(Level::INFO, "Request received");
        assert_eq!(sink.line(&record), record.render());
    }

    #[test]
    fn console_write_succeeds() {
        let sink = ConsoleSink::new(true);
        let record = LogRecord::now(Level::DEBUG, "console mirror");
        assert!(sink.write(&record).is_ok());
    }
}
