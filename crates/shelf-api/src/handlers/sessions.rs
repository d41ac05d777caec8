//! Session administration.

use axum::Json;
use axum::extract::{Path, State};
use tracing::info;

use crate::dto::response::{ApiResponse, InvalidationResponse};
use crate::error::ApiError;
use crate::extractors::AuthAccount;
use crate::state::AppState;

/// DELETE /api/accounts/{username}/sessions
///
/// Owner only; the extractor rejects non-owners for DELETE.
pub async fn invalidate_sessions(
    State(state): State<AppState>,
    auth: AuthAccount,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<InvalidationResponse>>, ApiError> {
    let revoked = state.auth.mass_invalidate(&username).await;
    info!(by = %auth.username, username = %username, revoked, "Mass invalidation requested");

    Ok(Json(ApiResponse::ok(InvalidationResponse {
        username,
        revoked,
    })))
}
