//! Session extractors: pull the token from the `X-Session-Id` header or the
//! `session-id` cookie and resolve it against the session cache.

use axum::extract::FromRequestParts;
use axum::http::Method;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use shelf_auth::SessionValidator;
use shelf_auth::session::validator::{SESSION_COOKIE, SESSION_HEADER};
use shelf_core::error::AppError;
use shelf_entity::account::Account;

use crate::error::ApiError;
use crate::state::AppState;

/// The raw session token of the request, not yet validated.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for SessionToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok());
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(SESSION_COOKIE).map(|c| c.value());

        SessionValidator::resolve_token(header, cookie)
            .map(|token| SessionToken(token.to_string()))
            .ok_or_else(|| AppError::not_authenticated("Session token is missing").into())
    }
}

/// The account behind a validated session.
///
/// Any method other than GET, HEAD, or OPTIONS counts as mutating and
/// requires an owner account.
#[derive(Debug, Clone)]
pub struct AuthAccount {
    /// The session's account, password hash cleared.
    pub account: Account,
    /// The token the request presented.
    pub token: String,
}

impl std::ops::Deref for AuthAccount {
    type Target = Account;
    fn deref(&self) -> &Self::Target {
        &self.account
    }
}

/// Whether a request with this method modifies data.
pub fn is_mutating(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

impl FromRequestParts<AppState> for AuthAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SessionToken(token) = SessionToken::from_request_parts(parts, state).await?;
        let account = state
            .validator
            .validate(&token, is_mutating(&parts.method))
            .await?;
        Ok(AuthAccount { account, token })
    }
}
