//! Handler for the health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health with per-component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: store reachable and worker pool running
/// - **503 Service Unavailable**: otherwise
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "Connected" },
///     "worker_pool": { "status": "ok", "message": "5 workers, 0/100 queued" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store = check_store(&state).await;
    let worker_pool = check_worker_pool(&state);

    let all_healthy = store.is_ok() && worker_pool.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { store, worker_pool },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_store(state: &AppState) -> CheckStatus {
    match state.store.ping().await {
        Ok(()) => CheckStatus::ok("Connected"),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: store unreachable");
            CheckStatus::error("Store unreachable")
        }
    }
}

fn check_worker_pool(state: &AppState) -> CheckStatus {
    let pool = state.gateway.pool();
    if pool.is_stopped() {
        CheckStatus::error("Worker pool is stopped")
    } else {
        CheckStatus::ok(format!(
            "{} workers, {}/{} queued",
            pool.worker_count(),
            pool.queued_jobs(),
            pool.capacity()
        ))
    }
}
