//! Browser UI over HTTP.
//!
//! One page, one upload form. Each browser gets its own
//! [`ExtractionSession`](crate::session::ExtractionSession) through a
//! session cookie, so reloading the page or toggling the JSON view re-renders
//! the cached result instead of calling the engine again.

pub mod routes;
pub mod state;

pub use state::{AppState, SessionStore};

use crate::session::ScanContext;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.context().config().max_upload_bytes;

    Router::new()
        .route("/", get(routes::index))
        .route("/scan", post(routes::scan))
        .route("/tables/:number/csv", get(routes::table_csv))
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the UI on `ctx.config().bind` until Ctrl+C / SIGTERM.
pub async fn serve(ctx: Arc<ScanContext>) -> std::io::Result<()> {
    let addr = ctx.config().bind;
    let app = router(AppState::new(ctx));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("docscan listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting graceful shutdown..."),
    }
}
