//! The ingestion endpoint. Absorbs every report; never fails the caller.
use super::SinkState;
use crate::types::{ErrorReport, ReportKind};
use axum::{body::Body, extract::State, http::StatusCode};
use std::sync::Arc;
use tracing::warn;

/// Largest report body read in full (1 MiB).
pub const MAX_REPORT_BYTES: usize = 1024 * 1024;

/// Renders a received body as the message of its report-log line.
///
/// Every input yields exactly one message: well-formed reports branch on
/// their `type`, anything else is recorded verbatim.
pub fn describe_report(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorReport>(body) {
        Ok(report) => match report.kind() {
            ReportKind::UnhandledRejection => {
                format!("Client Unhandled Rejection: {}", report.to_line())
            }
            ReportKind::Error(_) => format!("Client Error occurred: {}", report.to_line()),
            ReportKind::Untyped => format!("Client report without type: {}", report.to_line()),
        },
        Err(e) => {
            warn!(error = %e, "Malformed error report body");
            format!(
                "Client sent malformed error report: {}",
                String::from_utf8_lossy(body)
            )
        }
    }
}

/// Records a client report at `error` severity and acknowledges it.
#[axum::debug_handler]
pub async fn log_error(State(state): State<Arc<SinkState>>, body: Body) -> StatusCode {
    match axum::body::to_bytes(body, MAX_REPORT_BYTES).await {
        Ok(bytes) => state.logger.error(describe_report(&bytes)),
        Err(e) => {
            warn!(error = %e, "Failed to read error report body");
            state
                .logger
                .error(format!("Client sent unreadable error report: {}", e));
        }
    }
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{Logger, MemorySink};
    use crate::types::INGEST_PATH;
    use crate::web::{app, PageConfig};
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;
    use tracing::Level;

    async fn post(body: impl Into<Body>) -> (StatusCode, Vec<String>) {
        let memory = Arc::new(MemorySink::new(64));
        let logger = Logger::new(Level::DEBUG).with_sink(memory.clone());
        let state = Arc::new(SinkState::new(
            logger,
            PageConfig {
                index_path: "index.html".into(),
                inject: true,
            },
        ));

        let response = app(state, None)
            .oneshot(
                Request::post(INGEST_PATH)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();

        let records = memory.records();
        assert!(records.iter().all(|r| r.level == Level::ERROR));
        (response.status(), memory.lines())
    }

    fn json_of(line: &str) -> Value {
        let (_, json) = line.split_once(": {").expect("json payload");
        serde_json::from_str(&format!("{{{json}")).unwrap()
    }

    #[tokio::test]
    async fn logs_full_error_report() {
        let body = r#"{
            "type": "TypeError",
            "message": "x is not a function",
            "source": "app.js",
            "lineno": 42,
            "colno": 7,
            "error": "TypeError: x is not a function",
            "stack": "TypeError: x is not a function\n    at app.js:42:7"
        }"#;

        let (status, lines) = post(body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(" [ERROR]: Client Error occurred: "));
        let value = json_of(&lines[0]);
        assert_eq!(value["type"], "TypeError");
        assert_eq!(value["message"], "x is not a function");
        assert_eq!(value["source"], "app.js");
        assert_eq!(value["lineno"], 42);
        assert_eq!(value["colno"], 7);
        assert_eq!(value["error"], "TypeError: x is not a function");
        assert!(value["stack"].as_str().unwrap().contains("app.js:42:7"));
    }

    #[tokio::test]
    async fn rejection_gets_its_own_line_format() {
        let body = r#"{"type":"unhandledRejection","reason":"timeout","stack":null}"#;

        let (status, lines) = post(body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Client Unhandled Rejection: "));
        assert_eq!(json_of(&lines[0])["reason"], "timeout");
    }

    #[tokio::test]
    async fn missing_fields_still_logged_once() {
        let (status, lines) = post("{}").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Client report without type: "));
    }

    #[tokio::test]
    async fn malformed_body_is_absorbed() {
        let (status, lines) = post("not json at all").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("Client sent malformed error report: not json at all"));
    }

    #[tokio::test]
    async fn wrongly_typed_fields_are_absorbed() {
        let (status, lines) = post(r#"{"type":"Error","lineno":"forty-two"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("malformed error report"));
    }

    #[tokio::test]
    async fn oversized_body_is_still_acknowledged() {
        let (status, lines) = post(vec![b'a'; MAX_REPORT_BYTES + 1]).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("unreadable error report"));
    }
}
