//! Per-request session validation.

use std::sync::Arc;

use tracing::debug;

use shelf_core::error::AppError;
use shelf_core::result::AppResult;
use shelf_entity::account::Account;

use super::store::SessionStore;

/// Request header carrying the session token.
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Cookie carrying the session token when the header is absent.
pub const SESSION_COOKIE: &str = "session-id";

/// Read-only gate in front of every authenticated request.
#[derive(Debug, Clone)]
pub struct SessionValidator {
    sessions: Arc<SessionStore>,
}

impl SessionValidator {
    /// Creates a validator over the shared session store.
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    /// Pick the token from the header, falling back to the cookie.
    ///
    /// An empty header counts as absent.
    pub fn resolve_token<'a>(header: Option<&'a str>, cookie: Option<&'a str>) -> Option<&'a str> {
        header
            .filter(|h| !h.is_empty())
            .or(cookie)
            .filter(|t| !t.is_empty())
    }

    /// Resolve `token` to its account and check it may perform the request.
    ///
    /// Mutating requests need an owner session.
    pub async fn validate(&self, token: &str, is_mutating: bool) -> AppResult<Account> {
        if token.is_empty() {
            return Err(AppError::not_authenticated("Session token is missing"));
        }

        let Some(account) = self.sessions.get(token).await else {
            debug!("Session token unknown or expired");
            return Err(AppError::not_authenticated("Session has expired"));
        };

        if is_mutating && !account.owner {
            return Err(AppError::insufficient_privilege(
                "Account does not have permission to modify data",
            ));
        }

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shelf_core::error::ErrorKind;

    use super::*;

    async fn make_validator() -> SessionValidator {
        let sessions = Arc::new(SessionStore::new());
        let reader = Account {
            id: 1,
            username: "reader".into(),
            password_hash: String::new(),
            owner: false,
        };
        let owner = Account {
            id: 2,
            username: "root".into(),
            password_hash: String::new(),
            owner: true,
        };
        sessions.insert("reader-token", reader, Duration::from_secs(60)).await;
        sessions.insert("owner-token", owner, Duration::from_secs(60)).await;
        SessionValidator::new(sessions)
    }

    #[test]
    fn test_resolve_token_prefers_header() {
        assert_eq!(SessionValidator::resolve_token(Some("h"), Some("c")), Some("h"));
        assert_eq!(SessionValidator::resolve_token(None, Some("c")), Some("c"));
        assert_eq!(SessionValidator::resolve_token(Some(""), Some("c")), Some("c"));
        assert_eq!(SessionValidator::resolve_token(None, None), None);
        assert_eq!(SessionValidator::resolve_token(Some(""), Some("")), None);
    }

    #[tokio::test]
    async fn test_empty_and_unknown_tokens() {
        let validator = make_validator().await;
        let err = validator.validate("", false).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotAuthenticated);
        let err = validator.validate("nope", false).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_read_allowed_for_any_session() {
        let validator = make_validator().await;
        assert_eq!(validator.validate("reader-token", false).await.unwrap().username, "reader");
        assert_eq!(validator.validate("owner-token", false).await.unwrap().username, "root");
    }

    #[tokio::test]
    async fn test_mutation_requires_owner() {
        let validator = make_validator().await;
        let err = validator.validate("reader-token", true).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InsufficientPrivilege);
        assert!(validator.validate("owner-token", true).await.unwrap().owner);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_session_is_rejected() {
        let validator = make_validator().await;
        tokio::time::advance(Duration::from_secs(61)).await;
        let err = validator.validate("owner-token", false).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotAuthenticated);
    }
}
