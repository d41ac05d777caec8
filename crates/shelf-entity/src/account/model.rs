//! Account entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Username of the synthetic account issued by the bootstrap login.
pub const BOOTSTRAP_USERNAME: &str = "admin";

/// A stored account able to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Unique account identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Salted Argon2id password hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Owners may perform mutating operations.
    pub owner: bool,
}

impl Account {
    /// Returns a copy of this account with the password hash cleared.
    pub fn sanitized(&self) -> Self {
        Self {
            id: self.id,
            username: self.username.clone(),
            password_hash: String::new(),
            owner: self.owner,
        }
    }

    /// The owner account handed out by the bootstrap login while no owner
    /// exists in storage. It has no stored credentials.
    pub fn bootstrap_owner() -> Self {
        Self {
            id: 0,
            username: BOOTSTRAP_USERNAME.to_string(),
            password_hash: String::new(),
            owner: true,
        }
    }
}

/// Data required to provision a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Grant owner privilege.
    pub owner: bool,
}
