//! Application state shared across all handlers and extractors.

use std::sync::Arc;

use shelf_auth::{AuthService, PasswordHasher, SessionStore, SessionValidator};
use shelf_core::config::AppConfig;
use shelf_database::CredentialStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Credential storage backend
    pub store: Arc<dyn CredentialStore>,
    /// Live sessions and the per-user index
    pub sessions: Arc<SessionStore>,
    /// Login and revocation
    pub auth: Arc<AuthService>,
    /// Per-request session checks
    pub validator: Arc<SessionValidator>,
}

impl AppState {
    /// Wire the auth services around a fresh, empty session store.
    pub fn new(config: AppConfig, store: Arc<dyn CredentialStore>, hasher: PasswordHasher) -> Self {
        let sessions = Arc::new(SessionStore::new());
        let auth = Arc::new(AuthService::new(
            Arc::clone(&store),
            Arc::clone(&sessions),
            hasher,
            config.auth.clone(),
        ));
        let validator = Arc::new(SessionValidator::new(Arc::clone(&sessions)));

        Self {
            config: Arc::new(config),
            store,
            sessions,
            auth,
            validator,
        }
    }
}
