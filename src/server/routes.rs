//! axum routes for the code endpoint.
//!
//! CHANGELOG:
//! - 10/18/2026 - Store failures answered with 503
//! - 10/18/2026 - Initial implementation

use std::future::Future;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use super::service::CodeService;
use crate::output::{error_body, CodeResponse};

/// Build the router serving `/get_code` and `/health`.
pub fn code_routes(service: CodeService) -> Router {
    Router::new()
        .route("/get_code", get(get_code))
        .route("/health", get(health))
        .with_state(service)
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, service: CodeService, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!(%addr, window_secs = service.window().as_secs(), "code endpoint listening");

    axum::serve(listener, code_routes(service))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    info!("code endpoint stopped");
    Ok(())
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "imessage-otp",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ── Code lookup ─────────────────────────────────────────────────────────

async fn get_code(State(service): State<CodeService>) -> Response {
    // rusqlite blocks; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || service.lookup()).await;

    match outcome {
        Ok(Ok(result)) => {
            debug!(status = ?result.status(), "get_code");
            Json(CodeResponse::from(&result)).into_response()
        }
        Ok(Err(e)) => {
            warn!(error = %e, "message store unavailable");
            unavailable(&e.to_string())
        }
        Err(e) => {
            warn!(error = %e, "lookup task failed");
            unavailable("Lookup task failed")
        }
    }
}

fn unavailable(error: &str) -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, Json(error_body(error))).into_response()
}
