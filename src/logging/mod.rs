//! This module contains the report-log infrastructure.
//!
//! Records flow through a leveled `Logger` into composable `LogSink`s: the
//! console mirror, the size-rotating file, and an in-memory buffer.
pub mod buffer;
pub mod logger;
pub mod record;
pub mod rotating;
pub mod sink;
pub mod startup;

pub use buffer::MemorySink;
pub use logger::Logger;
pub use record::LogRecord;
pub use rotating::{RotatingFileSink, RotationPolicy};
pub use sink::{ConsoleSink, LogSink, SinkError};
pub use startup::{check_log_file, LogFileStatus};
