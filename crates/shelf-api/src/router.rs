//! Route definitions for the Shelf HTTP API.
//!
//! Routes are mounted under `/api`, which itself sits under the configured
//! web root.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use shelf_core::config::app::normalize_root_path;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(session_routes())
        .merge(health_routes());

    let mut router = Router::new().nest("/api", api_routes);

    let root = normalize_root_path(&state.config.server.root_path);
    if root != "/" {
        router = Router::new().nest(root.trim_end_matches('/'), router);
    }

    router = router.layer(TraceLayer::new_for_http());
    if state.config.server.access_log {
        router = router.layer(axum_middleware::from_fn(middleware::logging::request_logging));
    }

    router.with_state(state)
}

/// Auth endpoints: login, logout, current session
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/session", get(handlers::auth::current_session))
}

/// Session administration
fn session_routes() -> Router<AppState> {
    Router::new().route(
        "/accounts/{username}/sessions",
        delete(handlers::sessions::invalidate_sessions),
    )
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
