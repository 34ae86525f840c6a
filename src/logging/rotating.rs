//! Size-rotating, append-only file output for the report log.
use super::{LogRecord, LogSink, SinkError};
use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use crate::capture::panic_message;
use std::cell::Cell;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Size ceiling of the active log file before it is rotated (5 MiB).
pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Number of rotated siblings kept next to the active file.
pub const DEFAULT_MAX_FILES: usize = 5;

/// When to roll the active file over and how many old files to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: usize,
    pub max_files: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

/// Appends records to a file and rotates it once it grows past the policy's
/// ceiling.
///
/// Rotated files are index-suffixed: `app.log.1` is the most recent,
/// `app.log.<max_files>` the oldest. The rotation check happens before a
/// write, so a record is never split across two files.
///
/// A panic raised while rotating is contained: the write fails with
/// [`SinkError::Unavailable`] and the file is reopened on the next write.
pub struct RotatingFileSink {
    path: PathBuf,
    policy: RotationPolicy,
    file: Mutex<Option<FileRotate<AppendCount>>>,
}

thread_local! {
    static WRITING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside [`RotatingFileSink::write`].
struct WriteGuard;

impl WriteGuard {
    fn enter() -> Option<Self> {
        WRITING.with(|writing| (!writing.replace(true)).then_some(WriteGuard))
    }
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        WRITING.with(|writing| writing.set(false));
    }
}

impl RotatingFileSink {
    /// Opens (or creates) the log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy is unusable or the file cannot be
    /// opened for appending.
    pub fn open(path: impl AsRef<Path>, policy: RotationPolicy) -> Result<Self, SinkError> {
        if policy.max_bytes == 0 {
            return Err(SinkError::Unavailable(
                "rotation size ceiling must be greater than zero".to_string(),
            ));
        }

        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        // FileRotate swallows open failures, probe the file first.
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        let file = open_rotate(&path, policy)?;

        Ok(Self {
            path,
            policy,
            file: Mutex::new(Some(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Paths of the rotated siblings, newest first.
    pub fn rotated_paths(&self) -> Vec<PathBuf> {
        let (Some(dir), Some(name)) = (self.path.parent(), self.path.file_name()) else {
            return Vec::new();
        };
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        let prefix = format!("{}.", name.to_string_lossy());

        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut rotated: Vec<(usize, PathBuf)> = entries
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let file_name = entry.file_name();
                let index = file_name.to_str()?.strip_prefix(&prefix)?.parse().ok()?;
                Some((index, entry.path()))
            })
            .collect();
        rotated.sort_by_key(|(index, _)| *index);
        rotated.into_iter().map(|(_, path)| path).collect()
    }
}

/// Builds the rotating writer. `FileRotate` panics when it cannot create
/// the log directory; that is reported as an unavailable sink.
fn open_rotate(path: &Path, policy: RotationPolicy) -> Result<FileRotate<AppendCount>, SinkError> {
    panic::catch_unwind(|| {
        FileRotate::new(
            path,
            AppendCount::new(policy.max_files),
            ContentLimit::BytesSurpassed(policy.max_bytes),
            Compression::None,
            #[cfg(unix)]
            None,
        )
    })
    .map_err(|payload| {
        SinkError::Unavailable(format!(
            "cannot open {}: {}",
            path.display(),
            panic_message(payload.as_ref())
        ))
    })
}

impl LogSink for RotatingFileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        // A panic hook logging from inside a failed write would wait on our
        // own lock.
        let Some(_guard) = WriteGuard::enter() else {
            return Err(SinkError::Unavailable(
                "re-entrant write while the log file is busy".to_string(),
            ));
        };

        let mut line = record.render();
        line.push('\n');

        // The lock spans the rotation check and the append, so rotation
        // cannot drop or split a concurrent record.
        let mut slot = self
            .file
            .lock()
            .map_err(|_| SinkError::Unavailable("log file lock poisoned".to_string()))?;
        if slot.is_none() {
            *slot = Some(open_rotate(&self.path, self.policy)?);
        }
        let Some(file) = slot.as_mut() else {
            return Err(SinkError::Unavailable("log file closed".to_string()));
        };

        let written = panic::catch_unwind(AssertUnwindSafe(|| {
            file.write_all(line.as_bytes())?;
            file.flush()
        }));
        match written {
            Ok(result) => Ok(result?),
            Err(payload) => {
                *slot = None;
                Err(SinkError::Unavailable(format!(
                    "rotation of {} failed: {}",
                    self.path.display(),
                    panic_message(payload.as_ref())
                )))
            }
        }
    }
}
