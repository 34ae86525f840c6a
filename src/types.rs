//! Wire types shared by the capture agent and the report sink.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Path of the ingestion endpoint.
pub const INGEST_PATH: &str = "/log-error";

/// The `type` tag carried by rejection reports.
pub const UNHANDLED_REJECTION: &str = "unhandledRejection";

/// The `type` tag used when no error-class name is available.
pub const GENERIC_ERROR: &str = "Error";

/// A normalized description of one client-side fault.
///
/// Every field is serialized even when it does not apply to the event kind,
/// so a rejection report carries `"source": null` rather than omitting it.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ErrorReport {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub lineno: Option<u64>,
    #[serde(default)]
    pub colno: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
    /// Fields sent by the page that are not part of the report shape.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How the sink branches on a report's `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    UnhandledRejection,
    Error(String),
    Untyped,
}

impl ErrorReport {
    /// Builds a rejection report from the string form and stack of the reason.
    pub fn rejection(reason: String, stack: Option<String>) -> Self {
        Self {
            kind: UNHANDLED_REJECTION.to_string(),
            message: Some(reason.clone()),
            reason: Some(reason),
            stack,
            ..Self::default()
        }
    }

    pub fn kind(&self) -> ReportKind {
        match self.kind.trim() {
            "" => ReportKind::Untyped,
            UNHANDLED_REJECTION => ReportKind::UnhandledRejection,
            name => ReportKind::Error(name.to_string()),
        }
    }

    /// One-line human readable summary, as mirrored to the local console.
    pub fn summary(&self) -> String {
        match self.kind() {
            ReportKind::UnhandledRejection => format!(
                "Unhandled Rejection: {}",
                self.reason.as_deref().unwrap_or("undefined")
            ),
            ReportKind::Error(name) => format!(
                "Uncaught {}: {}",
                name,
                self.message.as_deref().unwrap_or("")
            ),
            ReportKind::Untyped => format!(
                "Uncaught error: {}",
                self.message.as_deref().unwrap_or("")
            ),
        }
    }

    /// Compact single-line JSON. Falls back to the summary if serialization fails.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_fields_serialize_as_null() {
        let report = ErrorReport::rejection("boom".to_string(), None);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["type"], "unhandledRejection");
        assert_eq!(value["reason"], "boom");
        for field in ["source", "lineno", "colno", "error", "stack"] {
            assert!(value.get(field).is_some(), "{field} was omitted");
            assert!(value[field].is_null(), "{field} should be null");
        }
    }

    #[test]
    fn missing_fields_still_deserialize() {
        let report: ErrorReport = serde_json::from_value(json!({ "message": "x" })).unwrap();
        assert_eq!(report.kind(), ReportKind::Untyped);
        assert_eq!(report.message.as_deref(), Some("x"));
        assert!(report.stack.is_none());
    }

    #[test]
    fn unknown_fields_are_kept() {
        let report: ErrorReport =
            serde_json::from_value(json!({ "type": "TypeError", "page": "/cart" })).unwrap();
        assert_eq!(report.kind(), ReportKind::Error("TypeError".to_string()));
        assert!(report.to_line().contains("\"page\":\"/cart\""));
    }

    #[test]
    fn summary_follows_kind() {
        let rejection = ErrorReport::rejection("nope".to_string(), None);
        assert_eq!(rejection.summary(), "Unhandled Rejection: nope");

        let error = ErrorReport {
            kind: "RangeError".to_string(),
            message: Some("too far".to_string()),
            ..ErrorReport::default()
        };
        assert_eq!(error.summary(), "Uncaught RangeError: too far");
    }
}
