//! HTTP/WebSocket server for Conwatch.
//!
//! Hosts two routes: the static dashboard page at `/` and the WebSocket
//! upgrade endpoint at `/ws`. Each accepted upgrade becomes one session in
//! the shared [`SessionRegistry`]. No origin validation is performed on
//! upgrade requests; the endpoint is intended for trusted networks.

pub mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::response::Html;
use axum::routing::get;
use conwatch_common::constants::WS_PATH;
use conwatch_sync::SessionRegistry;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Registry the upgrade endpoint registers new sessions with.
    pub registry: Arc<SessionRegistry>,
}

/// Builds the application router.
#[must_use]
pub fn router(registry: Arc<SessionRegistry>) -> Router {
    Router::new()
        .route("/", get(index))
        .route(WS_PATH, get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { registry })
}

/// Serves the embedded dashboard page.
async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

/// Binds the listener and serves until the cancellation token fires.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(
    addr: SocketAddr,
    registry: Arc<SessionRegistry>,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");

    let app = router(registry);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}
