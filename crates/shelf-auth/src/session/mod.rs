//! Session lifecycle: login, cache, per-user index, validation, and sweeping.

pub mod cleanup;
pub mod index;
pub mod service;
pub mod store;
pub mod validator;

pub use cleanup::SessionSweeper;
pub use index::UserSessionIndex;
pub use service::{AuthService, LoginRequest};
pub use store::SessionStore;
pub use validator::SessionValidator;
