//! Startup self-check of the report log destination.
use std::fs::OpenOptions;
use std::io::{self, ErrorKind};
use std::path::Path;

/// Outcome of checking the log file before the server accepts traffic.
#[derive(Debug)]
pub enum LogFileStatus {
    /// The file existed and is writable.
    Ready,
    /// The file was missing and has been created.
    Created,
    /// The file exists but cannot be written, or could not be created.
    Inaccessible(io::Error),
}

impl LogFileStatus {
    pub fn is_usable(&self) -> bool {
        !matches!(self, LogFileStatus::Inaccessible(_))
    }
}

/// Verifies that `path` exists and is writable, creating it when absent.
///
/// Never fails: an unusable destination is reported through the returned
/// status so the caller can degrade to console-only logging.
pub fn check_log_file(path: &Path) -> LogFileStatus {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => LogFileStatus::Inaccessible(io::Error::new(
            ErrorKind::Other,
            format!("{} is a directory", path.display()),
        )),
        Ok(_) => match OpenOptions::new().append(true).open(path) {
            Ok(_) => LogFileStatus::Ready,
            Err(e) => LogFileStatus::Inaccessible(e),
        },
        Err(e) if e.kind() == ErrorKind::NotFound => match create(path) {
            Ok(()) => LogFileStatus::Created,
            Err(e) => LogFileStatus::Inaccessible(e),
        },
        Err(e) => LogFileStatus::Inaccessible(e),
    }
}

fn create(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}
