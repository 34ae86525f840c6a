//! The capture agent: turns uncaught failures into `ErrorReport`s.
//!
//! The browser build of the agent is the embedded `error-capture.js` asset.
//! This module implements the same normalization for native processes and
//! hands reports to a `Transport` supplied at construction.
pub mod event;
pub mod transport;

pub use event::{ErrorEvent, ErrorObject, RejectionEvent, ThrownValue};
pub use transport::{HttpTransport, Transport};

use crate::types::{ErrorReport, GENERIC_ERROR};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::Location;
use std::sync::Arc;
use tracing::error;

/// The `type` tag of reports built from Rust panics.
pub const PANIC_TYPE: &str = "Panic";

/// Installs failure hooks and forwards normalized reports to its transport.
///
/// One agent is constructed per process (or page) lifetime; there is no
/// teardown, the process exit is the natural end of the hooks.
pub struct CaptureAgent<T: Transport> {
    transport: T,
}

impl<T: Transport> CaptureAgent<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Handles an uncaught error event and returns the report that was sent.
    pub fn on_error(&self, event: &ErrorEvent) -> ErrorReport {
        let report = normalize_error(event);
        self.emit(report.clone());
        report
    }

    /// Handles an unhandled rejection and returns the report that was sent.
    pub fn on_unhandled_rejection(&self, event: &RejectionEvent) -> ErrorReport {
        let report = normalize_rejection(event);
        self.emit(report.clone());
        report
    }

    /// Routes panics of this process through the agent.
    ///
    /// The previously installed panic hook still runs afterwards.
    pub fn install(self: Arc<Self>) {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let message = panic_message(info.payload());
            self.on_error(&panic_event(&message, info.location()));
            previous(info);
        }));
    }

    // Dispatch first, then mirror to the console; neither waits on the other.
    fn emit(&self, report: ErrorReport) {
        let summary = report.summary();
        self.transport.dispatch(report);
        error!("{}", summary);
    }
}

/// Builds a report from an error event, preferring the attached error object
/// over the bare event fields.
pub fn normalize_error(event: &ErrorEvent) -> ErrorReport {
    let object = event.error.as_ref().and_then(ThrownValue::as_error);

    let kind = object
        .and_then(ErrorObject::class_name)
        .unwrap_or(GENERIC_ERROR)
        .to_string();
    let message = match object {
        Some(error) => error.message.clone(),
        None => event.message.clone(),
    };
    let error = match &event.error {
        Some(thrown) => thrown.describe(),
        None => event.message.clone(),
    };

    ErrorReport {
        kind,
        message: Some(message),
        source: event.filename.clone().filter(|name| !name.is_empty()),
        lineno: event.lineno,
        colno: event.colno,
        error: Some(error),
        reason: None,
        stack: object.and_then(|error| error.stack.clone()),
        ..ErrorReport::default()
    }
}

pub fn normalize_rejection(event: &RejectionEvent) -> ErrorReport {
    ErrorReport::rejection(event.reason.describe(), event.reason.stack())
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

fn panic_event(message: &str, location: Option<&Location<'_>>) -> ErrorEvent {
    let backtrace = Backtrace::capture();
    let mut object = ErrorObject::new(PANIC_TYPE, message);
    if backtrace.status() == BacktraceStatus::Captured {
        object = object.with_stack(backtrace.to_string());
    }

    let event = ErrorEvent::new(message).with_error(object);
    match location {
        Some(location) => event.at(
            location.file(),
            u64::from(location.line()),
            u64::from(location.column()),
        ),
        None => event,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn recording_agent() -> (
        CaptureAgent<impl Transport>,
        Arc<Mutex<Vec<ErrorReport>>>,
    ) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sink = sent.clone();
        let agent = CaptureAgent::new(move |report: ErrorReport| sink.lock().unwrap().push(report));
        (agent, sent)
    }

    #[test]
    fn error_event_with_error_object() {
        let (agent, sent) = recording_agent();
        let event = ErrorEvent::new("Uncaught TypeError: x is not a function")
            .at("app.js", 42, 7)
            .with_error(
                ErrorObject::new("TypeError", "x is not a function")
                    .with_stack("TypeError: x is not a function\n    at app.js:42:7"),
            );

        let report = agent.on_error(&event);

        assert_eq!(report.kind, "TypeError");
        assert_eq!(report.message.as_deref(), Some("x is not a function"));
        assert_eq!(report.source.as_deref(), Some("app.js"));
        assert_eq!(report.lineno, Some(42));
        assert_eq!(report.colno, Some(7));
        assert_eq!(report.error.as_deref(), Some("TypeError: x is not a function"));
        assert!(report.stack.as_deref().unwrap().contains("app.js:42:7"));
        assert!(report.reason.is_none());
        assert_eq!(*sent.lock().unwrap(), vec![report]);
    }

    #[test]
    fn cross_origin_error_falls_back_to_event_message() {
        let event = ErrorEvent::new("Script error.").at("", 0, 0);

        let report = normalize_error(&event);

        assert_eq!(report.kind, GENERIC_ERROR);
        assert_eq!(report.message.as_deref(), Some("Script error."));
        assert_eq!(report.error.as_deref(), Some("Script error."));
        assert!(report.source.is_none());
        assert!(report.stack.is_none());

        let value = serde_json::to_value(&report).unwrap();
        assert!(value["stack"].is_null());
    }

    #[test]
    fn nameless_error_object_defaults_type() {
        let object = ErrorObject {
            name: None,
            message: "odd".to_string(),
            stack: None,
        };
        let report = normalize_error(&ErrorEvent::new("odd").with_error(object));
        assert_eq!(report.kind, "Error");
    }

    #[test]
    fn thrown_string_is_reported_as_generic_error() {
        let report = normalize_error(&ErrorEvent::new("Uncaught oops").with_error("oops"));
        assert_eq!(report.kind, "Error");
        assert_eq!(report.message.as_deref(), Some("Uncaught oops"));
        assert_eq!(report.error.as_deref(), Some("oops"));
    }

    #[test]
    fn rejection_with_plain_string_reason() {
        let (agent, sent) = recording_agent();

        let report = agent.on_unhandled_rejection(&RejectionEvent::new("timeout"));

        assert_eq!(report.kind, "unhandledRejection");
        assert_eq!(report.reason.as_deref(), Some("timeout"));
        assert_eq!(report.message.as_deref(), Some("timeout"));
        assert!(report.stack.is_none());
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn rejection_with_opaque_or_missing_reason() {
        for reason in [ThrownValue::Opaque, ThrownValue::Undefined, ThrownValue::Null] {
            let report = normalize_rejection(&RejectionEvent::new(reason));
            assert!(!report.kind.is_empty());
            assert!(report.reason.as_deref().is_some_and(|r| !r.is_empty()));
            assert!(report.stack.is_none());
        }
    }

    #[test]
    fn rejection_with_error_reason_keeps_stack() {
        let reason = ErrorObject::new("Error", "fetch failed").with_stack("Error: fetch failed\n    at load");
        let report = normalize_rejection(&RejectionEvent::new(reason));
        assert_eq!(report.reason.as_deref(), Some("Error: fetch failed"));
        assert!(report.stack.is_some());
    }

    #[test]
    fn panic_event_carries_location() {
        let location = Location::caller();
        let report = normalize_error(&panic_event("index out of bounds", Some(location)));

        assert_eq!(report.kind, PANIC_TYPE);
        assert_eq!(report.message.as_deref(), Some("index out of bounds"));
        assert_eq!(report.error.as_deref(), Some("Panic: index out of bounds"));
        assert!(report.source.as_deref().unwrap().ends_with("mod.rs"));
        assert_eq!(report.lineno, Some(u64::from(location.line())));
    }

    #[test]
    fn panic_payloads_are_described() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "Box<dyn Any>");
    }

    #[test]
    fn installed_agent_reports_panics_and_chains_previous_hook() {
        let _hooks = crate::PANIC_HOOK_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let chained = Arc::new(AtomicUsize::new(0));
        let counter = chained.clone();
        std::panic::set_hook(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let (agent, sent) = recording_agent();
        Arc::new(agent).install();
        let result = std::panic::catch_unwind(|| panic!("worker lost its queue"));
        drop(std::panic::take_hook());

        assert!(result.is_err());
        let reports: Vec<ErrorReport> = sent
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.message.as_deref() == Some("worker lost its queue"))
            .cloned()
            .collect();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, PANIC_TYPE);
        assert_eq!(reports[0].source.as_deref(), Some(file!()));
        assert!(reports[0].lineno.is_some());
        assert!(reports[0].colno.is_some());
        assert_eq!(reports[0].error.as_deref(), Some("Panic: worker lost its queue"));
        assert!(chained.load(Ordering::SeqCst) >= 1);
    }
}
