//! Request DTOs with validation.

use std::fmt;

use serde::Deserialize;
use validator::Validate;

/// Login request body.
#[derive(Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Issue a long-lived session.
    #[serde(default)]
    pub remember: bool,
    /// Demand owner privileges.
    #[serde(default)]
    pub owner: bool,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("remember", &self.remember)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl From<LoginRequest> for shelf_auth::LoginRequest {
    fn from(req: LoginRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
            owner: req.owner,
            remember: req.remember,
        }
    }
}
