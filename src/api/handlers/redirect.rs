//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::ClientKey;

/// Redirects a short code to its long URL with `302 Found`.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Errors
///
/// - 404 if the code is unknown or expired
/// - 429 if the client exceeded its rate limit
/// - 500 if the stored URL cannot be sent as a `Location` header
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
) -> Result<impl IntoResponse, AppError> {
    let long_url = state
        .gateway
        .resolve(&client, &code, state.deadline())
        .await?;

    let location = HeaderValue::from_bytes(long_url.as_bytes()).map_err(|_| {
        tracing::error!(code = %code, "Stored URL is not a valid Location header");
        AppError::internal("Stored URL cannot be redirected to", json!({ "code": code }))
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]))
}
