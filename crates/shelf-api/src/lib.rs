//! # shelf-api
//!
//! HTTP API layer for Shelf built on Axum.
//!
//! Provides the login, logout, session, and mass-invalidation endpoints,
//! the session extractors, request logging, and the error-to-response mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, init_logging, run_server};
pub use error::ApiError;
pub use state::AppState;
