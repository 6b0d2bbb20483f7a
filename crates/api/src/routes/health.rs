//! Service banner and health checks.

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use serde_json::{Value, json};

use crate::state::AppState;
use crate::store::DocumentStore;

/// Upper bound on a store ping from the health endpoints.
pub const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Health summary returned by `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// Process start time (RFC 3339).
    pub build_time: String,
    /// Store backend, or `"none"` when no store is configured.
    pub database: &'static str,
    /// `"connected"` or `"disconnected"`.
    pub db_status: &'static str,
}

/// Service banner.
pub async fn home() -> Json<Value> {
    Json(json!({ "message": "CloudMart API Running" }))
}

/// Liveness health check endpoint.
///
/// Always answers 200 while the process is up; the store status is reported
/// in the body.
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let (database, db_status) = match state.store_handle() {
        Some(store) => {
            let status = if ping(store.as_ref()).await {
                "connected"
            } else {
                "disconnected"
            };
            (store.backend(), status)
        }
        None => ("none", "disconnected"),
    };

    Json(HealthReport {
        status: "healthy",
        service: "cloudmart-api",
        version: env!("CARGO_PKG_VERSION"),
        build_time: state.started_at().to_rfc3339(),
        database,
        db_status,
    })
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if no store is configured or it does not
/// answer a ping.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(store) = state.store_handle() else {
        return StatusCode::SERVICE_UNAVAILABLE;
    };

    if ping(store.as_ref()).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Ping the store, giving up after [`PING_TIMEOUT`].
async fn ping(store: &dyn DocumentStore) -> bool {
    match tokio::time::timeout(PING_TIMEOUT, store.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Store ping failed");
            false
        }
        Err(_) => {
            tracing::warn!(timeout_secs = PING_TIMEOUT.as_secs(), "Store ping timed out");
            false
        }
    }
}
