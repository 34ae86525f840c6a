//! The main entry point for the error relay.
use anyhow::Result;

/// The main function of the application.
///
/// This function is the entry point for the error relay. It checks the
/// report log destination and then serves the page and ingestion endpoints
/// until the process is stopped.
///
/// # Errors
///
/// Returns an error if the relay fails to start or its listener fails.
#[tokio::main]
async fn main() -> Result<()> {
    error_relay::app::launch().await
}
