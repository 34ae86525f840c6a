//! The page endpoint: serves the site document with the capture agent.
use super::{no_cache_headers, server_error, SinkState, CAPTURE_SCRIPT_PATH};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

/// Attribute marking an inline capture script; its presence means the
/// document already embeds the agent.
pub const CAPTURE_MARKER: &str = "data-error-capture";

/// Result of preparing a document for serving.
#[derive(Debug, PartialEq, Eq)]
pub enum Injection {
    AlreadyPresent,
    Injected(String),
}

/// Inserts `script` inline before the last `</body>` of `html`, or at the
/// end when the document has no closing body tag.
///
/// Documents that already carry the marker or reference the served script
/// are left untouched.
pub fn inject_capture_script(html: &str, script: &str) -> Injection {
    if html.contains(CAPTURE_MARKER) || html.contains(CAPTURE_SCRIPT_PATH) {
        return Injection::AlreadyPresent;
    }

    let tag = format!("<script {CAPTURE_MARKER}>\n{script}</script>\n");
    let mut document = String::with_capacity(html.len() + tag.len());

    // ASCII lowercasing keeps byte offsets aligned with `html`.
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(index) => {
            document.push_str(&html[..index]);
            document.push_str(&tag);
            document.push_str(&html[index..]);
        }
        None => {
            document.push_str(html);
            document.push_str(&tag);
        }
    }
    Injection::Injected(document)
}

/// Serves the site document, read from disk on every request.
#[axum::debug_handler]
pub async fn serve_page(State(state): State<Arc<SinkState>>) -> Response {
    state.logger.info("Request received");

    let path = &state.page.index_path;
    let html = match tokio::fs::read_to_string(path).await {
        Ok(html) => html,
        Err(e) => {
            state
                .logger
                .error(format!("Failed to read page {}: {}", path.display(), e));
            return server_error();
        }
    };

    let html = match (&state.capture_script, state.page.inject) {
        (Some(script), true) => match inject_capture_script(&html, script) {
            Injection::AlreadyPresent => {
                state.logger.info("Error capture script already present in page");
                html
            }
            Injection::Injected(document) => {
                state.logger.info("Error capture script injected into page");
                document
            }
        },
        _ => html,
    };

    (StatusCode::OK, no_cache_headers(), Html(html)).into_response()
}
