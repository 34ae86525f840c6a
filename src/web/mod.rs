//! The report sink's HTTP surface: the page endpoint, the ingestion
//! endpoint, and the embedded capture script.
mod ingest;
mod page;

pub use ingest::{describe_report, MAX_REPORT_BYTES};
pub use page::{inject_capture_script, Injection, CAPTURE_MARKER};

use crate::logging::Logger;
use crate::types::INGEST_PATH;
use anyhow::Result;
use axum::{
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use rust_embed::RustEmbed;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};
use tracing::info;

/// Path under which the capture script is served for documents that embed
/// it by reference.
pub const CAPTURE_SCRIPT_PATH: &str = "/error-capture.js";

const CAPTURE_SCRIPT_ASSET: &str = "error-capture.js";

static SURROGATE_CONTROL: HeaderName = HeaderName::from_static("surrogate-control");
static CLEAR_SITE_DATA: HeaderName = HeaderName::from_static("clear-site-data");

#[derive(RustEmbed)]
#[folder = "assets"]
struct Assets;

/// How the page endpoint finds and prepares its document.
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// The HTML document, read from disk on every request.
    pub index_path: PathBuf,
    /// Inject the capture script when the document does not embed it.
    pub inject: bool,
}

/// Shared state of the running sink.
pub struct SinkState {
    pub logger: Logger,
    pub page: PageConfig,
    capture_script: Option<String>,
}

impl SinkState {
    pub fn new(logger: Logger, page: PageConfig) -> Self {
        Self {
            logger,
            page,
            capture_script: capture_script(),
        }
    }
}

/// Source of the embedded browser capture agent.
pub fn capture_script() -> Option<String> {
    Assets::get(CAPTURE_SCRIPT_ASSET).map(|file| String::from_utf8_lossy(&file.data).into_owned())
}

/// Builds the full application: routes, optional static fallback, middleware.
pub fn app(state: Arc<SinkState>, static_dir: Option<&Path>) -> Router {
    let mut router = routes(state);
    router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(not_found),
    };
    apply_middleware(router)
}

fn routes(state: Arc<SinkState>) -> Router {
    Router::new()
        .route("/", get(page::serve_page))
        .route(INGEST_PATH, post(ingest::log_error))
        .route(CAPTURE_SCRIPT_PATH, get(serve_capture_script))
        .with_state(state)
}

fn apply_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serves requests on `listener` until the process exits.
///
/// # Errors
///
/// Returns an error if the listener fails.
pub async fn start_server(
    state: Arc<SinkState>,
    static_dir: Option<PathBuf>,
    listener: tokio::net::TcpListener,
) -> Result<()> {
    let app = app(state, static_dir.as_deref());

    info!("Report sink listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Response headers forbidding caching at the browser, proxy and CDN.
pub fn no_cache_headers() -> [(HeaderName, &'static str); 5] {
    [
        (
            header::CACHE_CONTROL,
            "no-store, no-cache, must-revalidate, proxy-revalidate",
        ),
        (header::PRAGMA, "no-cache"),
        (header::EXPIRES, "0"),
        (SURROGATE_CONTROL.clone(), "no-store"),
        (CLEAR_SITE_DATA.clone(), "\"cache\""),
    ]
}

/// Generic failure response. Never carries the underlying cause.
pub fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "An error occurred").into_response()
}

async fn serve_capture_script() -> Response {
    match Assets::get(CAPTURE_SCRIPT_ASSET) {
        Some(content) => {
            let mime = mime_guess::from_path(CAPTURE_SCRIPT_ASSET).first_or_octet_stream();
            (
                StatusCode::OK,
                no_cache_headers(),
                [(header::CONTENT_TYPE, mime.to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => not_found().await,
    }
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}
