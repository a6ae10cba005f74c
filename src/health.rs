//! Liveness HTTP endpoint
//!
//! Hosting platforms check the bot over HTTP. `/health` answers with a small
//! JSON status, `/` with a landing page listing the guide's sections.

use crate::catalog::Catalog;
use crate::navigation::ConversationStore;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving.
    pub status: &'static str,
    /// Seconds since startup.
    pub uptime_secs: u64,
    /// Number of sections in the loaded catalog.
    pub sections: usize,
    /// Conversations currently tracked by the state store.
    pub conversations: usize,
}

/// Shared state of the HTTP handlers
#[derive(Clone)]
pub struct HealthState {
    started_at: Instant,
    titles: Arc<[String]>,
    store: ConversationStore,
}

impl HealthState {
    /// Snapshot the catalog titles and start the uptime clock.
    #[must_use]
    pub fn new(catalog: &Catalog, store: ConversationStore) -> Self {
        Self {
            started_at: Instant::now(),
            titles: catalog.all().iter().map(|s| s.title.clone()).collect(),
            store,
        }
    }
}

/// Build the router.
pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(landing_handler))
        .route("/health", get(health_handler))
        .fallback(not_found)
        .with_state(state)
}

/// Serve on `listener` until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns an error if the server stops on an I/O failure.
pub async fn serve(
    listener: TcpListener,
    state: HealthState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Health endpoint listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

/// GET /health
async fn health_handler(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
        sections: state.titles.len(),
        conversations: state.store.entry_count(),
    })
}

/// GET /
async fn landing_handler(State(state): State<HealthState>) -> Html<String> {
    Html(landing_page(&state.titles))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404 Not Found")
}

fn landing_page(titles: &[String]) -> String {
    let items: String = titles
        .iter()
        .map(|title| format!("<li>{}</li>", html_escape::encode_text(title)))
        .collect();
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"UTF-8\">\
         <title>🎯 Guide Bot</title></head>\n<body>\n<h1>🎯 Guide Bot</h1>\n\
         <p>✅ Online. Open the bot in Telegram and send /start.</p>\n\
         <ul>{items}</ul>\n</body>\n</html>\n"
    )
}
