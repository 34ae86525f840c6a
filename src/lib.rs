//! Client-error telemetry relay.
//!
//! Pages carry a capture agent that reports uncaught errors and unhandled
//! rejections to the report sink, which records them in a leveled,
//! size-rotating log next to its own request log lines.
pub mod app;
pub mod capture;
pub mod logging;
pub mod types;
pub mod web;

/// Serializes tests that replace the process-wide panic hook.
#[cfg(test)]
pub(crate) static PANIC_HOOK_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
