//! # shelf-auth
//!
//! Authentication and session management for Shelf.
//!
//! ## Modules
//!
//! - `password`: Argon2id password hashing and verification
//! - `session`: login flow, the session cache with its per-user index,
//!   request validation, and the background sweeper

pub mod password;
pub mod session;

pub use password::PasswordHasher;
pub use session::{
    AuthService, LoginRequest, SessionStore, SessionSweeper, SessionValidator, UserSessionIndex,
};
