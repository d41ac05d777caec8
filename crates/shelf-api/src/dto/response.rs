//! Response DTOs.

use serde::{Deserialize, Serialize};

use shelf_entity::account::Account;
use shelf_entity::session::Session;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Account as exposed over HTTP. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Owner privileges.
    pub owner: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            owner: account.owner,
        }
    }
}

/// Login response, `{session, account, expires}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Session token.
    pub session: String,
    /// The authenticated account.
    pub account: AccountResponse,
    /// Absolute expiry as an RFC 1123 date.
    pub expires: String,
}

impl From<Session> for LoginResponse {
    fn from(session: Session) -> Self {
        let expires = session.expires_rfc1123();
        Self {
            session: session.token,
            account: session.account.into(),
            expires,
        }
    }
}

/// Result of a mass invalidation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidationResponse {
    /// Whose sessions were revoked.
    pub username: String,
    /// How many live sessions were revoked.
    pub revoked: usize,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Storage engine in use.
    pub backend: String,
    /// Whether the storage engine answered.
    pub database: bool,
}
