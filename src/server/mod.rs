//! Axum plumbing shared by both services: the serve loop with graceful
//! shutdown, the `/` + `/health` routes, and the JSON error body.
//!
//! ## URL layout
//!
//! ```text
//! konsulent-api
//!   GET /               → {"message": ...}
//!   GET /konsulenter    → [Consultant]
//!   GET /health         → {"status": "healthy"}
//!
//! llm-verktoy-api
//!   GET /                                      → {"message": ...}
//!   GET /tilgjengelige-konsulenter/sammendrag  → {"sammendrag": ...}
//!   GET /health                                → {"status": "healthy"}
//! ```

pub mod query_api;
pub mod roster_api;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::AppError;
use crate::roster_client::FetchError;

// ── Error body ────────────────────────────────────────────────────────────────

/// Error returned by handlers, rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into() }
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        let status = match e {
            FetchError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            FetchError::UpstreamStatus(_) | FetchError::InvalidPayload(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

// ── Shared routes ─────────────────────────────────────────────────────────────

/// `GET /` with a fixed greeting and `GET /health`.
pub(crate) fn service_routes<S>(message: &'static str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(move || async move { Json(json!({ "message": message })) }))
        .route("/health", get(health))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

// ── Server loop ───────────────────────────────────────────────────────────────

/// Bind `bind_addr` and serve `router` until `shutdown` is cancelled.
pub async fn serve(
    service: &str,
    bind_addr: &str,
    router: Router,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;
    serve_listener(service, listener, router, shutdown).await
}

/// Serve on an already-bound listener (tests bind port 0 themselves).
pub async fn serve_listener(
    service: &str,
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let local_addr = listener.local_addr()?;
    info!(%service, %local_addr, "listening");

    axum::serve(listener, router.layer(TraceLayer::new_for_http()))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("{service} server error: {e}")))?;

    info!(%service, "shut down");
    Ok(())
}

/// Cancel `token` on Ctrl-C, or SIGTERM on unix.
pub fn spawn_shutdown_watcher(token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(_) => std::future::pending::<()>().await,
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("ctrl-c received — initiating shutdown"),
            _ = terminate => info!("SIGTERM received — initiating shutdown"),
        }
        token.cancel();
    });
}
