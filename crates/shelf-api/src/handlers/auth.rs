//! Auth handlers: login, logout, current session.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use validator::Validate;

use shelf_core::error::AppError;

use crate::dto::request::LoginRequest;
use crate::dto::response::{AccountResponse, ApiResponse, LoginResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthAccount, SessionToken};
use crate::state::AppState;

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = body?;
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid login request: {e}")))?;

    let session = state.auth.login(req.into()).await?;
    Ok(Json(LoginResponse::from(session)))
}

/// POST /api/logout
///
/// Any live session may end itself, owner or not.
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.validator.validate(&token, false).await?;
    state.auth.logout(&token).await;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Logged out successfully".to_string(),
    })))
}

/// GET /api/session
pub async fn current_session(auth: AuthAccount) -> Json<ApiResponse<AccountResponse>> {
    Json(ApiResponse::ok(AccountResponse::from(auth.account)))
}
