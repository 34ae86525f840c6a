//! This module handles the startup of the report sink.
use super::args::AppArgs;
use crate::capture::panic_message;
use crate::logging::{
    check_log_file, ConsoleSink, LogFileStatus, Logger, RotatingFileSink, RotationPolicy,
};
use crate::web::{PageConfig, SinkState};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Everything the sink needs to start serving.
pub struct PreparedApp {
    /// The command-line arguments.
    pub args: AppArgs,
    /// The address to listen on.
    pub addr: SocketAddr,
    /// Shared handler state, including the report logger.
    pub state: Arc<SinkState>,
    /// Directory served for paths without a dedicated route.
    pub static_dir: Option<PathBuf>,
}

/// Prepares the report sink for serving.
///
/// This function performs the following steps:
/// 1. Configures the diagnostic stream.
/// 2. Prints a start banner.
/// 3. Checks the report log destination, creating it when missing.
/// 4. Builds the report logger (console, plus file when usable).
/// 5. Routes process panics into the report log.
///
/// A log destination that cannot be written does not stop startup; the
/// logger then runs with the console sink only.
///
/// # Errors
///
/// This function will return an error if the listen address is invalid.
pub fn prepare(args: AppArgs) -> Result<PreparedApp> {
    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", args.bind, args.port))?;

    configure_diagnostics();
    print_start_banner(&args);

    let log_path = args.log_path();
    let policy = RotationPolicy {
        max_bytes: args.max_log_bytes,
        max_files: args.max_log_files,
    };
    let logger = build_logger(&log_path, policy, args.log_level, !args.no_color);
    install_panic_logging(logger.clone());

    let state = Arc::new(SinkState::new(
        logger,
        PageConfig {
            index_path: args.index_path(),
            inject: !args.no_inject,
        },
    ));
    let static_dir = (!args.no_static).then(|| args.site_dir.clone());

    Ok(PreparedApp {
        args,
        addr,
        state,
        static_dir,
    })
}

/// Configures the diagnostic stream on stderr.
///
/// `RUST_LOG` overrides the default directives.
fn configure_diagnostics() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,error_relay=debug,tower_http=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Prints a banner with startup information.
fn print_start_banner(args: &AppArgs) {
    println!("Starting error relay");
    println!("Address: {}:{}", args.bind, args.port);
    println!("Page: {}", args.index_path().display());
    println!("Report log: {}", args.log_path().display());
    println!();
}

/// Builds the report logger, degrading to console-only output when the log
/// file is not usable.
pub fn build_logger(
    log_path: &Path,
    policy: RotationPolicy,
    threshold: tracing::Level,
    color: bool,
) -> Logger {
    let logger = Logger::new(threshold).with_sink(Arc::new(ConsoleSink::new(color)));

    match check_log_file(log_path) {
        LogFileStatus::Ready => {}
        LogFileStatus::Created => info!("Created report log {}", log_path.display()),
        LogFileStatus::Inaccessible(e) => {
            warn!("Cannot access log file {}: {}", log_path.display(), e);
            return logger;
        }
    }

    match RotatingFileSink::open(log_path, policy) {
        Ok(file) => logger.with_sink(Arc::new(file)),
        Err(e) => {
            warn!("Cannot open log file {}: {}", log_path.display(), e);
            logger
        }
    }
}

/// Records panics anywhere in the process at `error`, then defers to the
/// previous hook. Tasks and handlers isolate panics, so serving continues.
fn install_panic_logging(logger: Logger) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let message = panic_message(info.payload());
        let location = info
            .location()
            .map(|l| format!(" at {}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_default();
        logger.error(format!("Uncaught Exception: {}{}", message, location));
        previous(info);
    }));
}
