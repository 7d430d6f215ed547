//! Handler for the shorten endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::ClientKey;

/// Creates, or returns the existing, short code for a long URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// { "long_url": "https://example.com/a" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "short_code": "3f2a9c1d",
///   "short_url": "http://localhost:8005/3f2a9c1d",
///   "long_url": "https://example.com/a"
/// }
/// ```
///
/// # Errors
///
/// - 400 if the URL is missing or malformed
/// - 429 if the client exceeded its rate limit
/// - 500 on timeout or exhausted code generation
/// - 503 if storage is unavailable or the service is shutting down
pub async fn shorten_handler(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let short_code = state
        .gateway
        .shorten(&client, &payload.long_url, state.deadline())
        .await?;

    Ok(Json(ShortenResponse {
        short_url: state.short_url(&short_code),
        short_code,
        long_url: payload.long_url,
    }))
}
