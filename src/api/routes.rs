//! API route configuration.

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{health_handler, redirect_handler, shorten_handler};
use crate::state::AppState;

/// Public routes of the service.
///
/// # Endpoints
///
/// - `POST /shorten` - Create or look up a short code
/// - `GET  /health`  - Store and worker pool status
/// - `GET  /{code}`  - Redirect to the long URL
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
}
