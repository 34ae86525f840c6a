//! Delivery of reports from the capture agent to the ingestion endpoint.
//!
//! Delivery is best-effort and at-most-once: `dispatch` never blocks the
//! caller, never retries, and a failed delivery is only noted locally.
use crate::types::{ErrorReport, INGEST_PATH};
use std::time::Duration;
use tracing::{debug, warn};

/// Hands a report off for delivery without waiting for the outcome.
pub trait Transport: Send + Sync + 'static {
    fn dispatch(&self, report: ErrorReport);
}

impl<F> Transport for F
where
    F: Fn(ErrorReport) + Send + Sync + 'static,
{
    fn dispatch(&self, report: ErrorReport) {
        self(report)
    }
}

/// Posts reports as JSON to a report sink over HTTP.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Creates a transport posting to `<base_url>/log-error`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), INGEST_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn dispatch(&self, report: ErrorReport) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime available, error report dropped");
                return;
            }
        };

        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        handle.spawn(async move {
            let outcome = client
                .post(&endpoint)
                .json(&report)
                .send()
                .await
                .and_then(|response| response.error_for_status());
            match outcome {
                Ok(_) => debug!("Delivered error report to {}", endpoint),
                Err(e) => warn!("Error report not delivered to {}: {}", endpoint, e),
            }
        });
    }
}
