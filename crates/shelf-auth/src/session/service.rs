//! Login and session revocation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use shelf_core::config::AuthConfig;
use shelf_core::error::AppError;
use shelf_core::result::AppResult;
use shelf_database::deadline::with_deadline;
use shelf_database::store::{CredentialStore, GetAccountsOptions};
use shelf_entity::account::{Account, BOOTSTRAP_USERNAME};
use shelf_entity::session::Session;

use crate::password::PasswordHasher;

use super::store::SessionStore;

/// Password accepted for the bootstrap owner while no owner account exists.
const BOOTSTRAP_PASSWORD: &str = "admin";

/// Attempts at drawing an unused token before giving up.
const MAX_TOKEN_ATTEMPTS: usize = 3;

/// Credentials and options submitted at login.
#[derive(Clone, Default)]
pub struct LoginRequest {
    /// Account name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Demand owner privileges for this session.
    pub owner: bool,
    /// Issue a long-lived session.
    pub remember: bool,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"****")
            .field("owner", &self.owner)
            .field("remember", &self.remember)
            .finish()
    }
}

/// Verifies credentials and issues sessions.
///
/// This is the only writer of the [`SessionStore`].
#[derive(Clone)]
pub struct AuthService {
    /// Persisted accounts.
    store: Arc<dyn CredentialStore>,
    /// Live sessions and the per-user index.
    sessions: Arc<SessionStore>,
    /// Password hasher.
    hasher: PasswordHasher,
    /// Lifetimes and lookup deadline.
    config: AuthConfig,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("backend", &self.store.backend())
            .field("config", &self.config)
            .finish()
    }
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        sessions: Arc<SessionStore>,
        hasher: PasswordHasher,
        config: AuthConfig,
    ) -> Self {
        Self {
            store,
            sessions,
            hasher,
            config,
        }
    }

    /// The session store this service writes to.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Performs the login flow:
    ///
    /// 1. Reject empty credentials
    /// 2. Bootstrap owner while no owner account exists (`admin`/`admin` only)
    /// 3. Look up the account and verify the password
    /// 4. Enforce the requested owner privilege
    /// 5. Cache and index a fresh session
    pub async fn login(&self, request: LoginRequest) -> AppResult<Session> {
        if request.username.is_empty() {
            return Err(AppError::validation("Username must not be empty"));
        }
        if request.password.is_empty() {
            return Err(AppError::validation("Password must not be empty"));
        }

        if self.is_bootstrap_login(&request).await? {
            info!(username = BOOTSTRAP_USERNAME, "No owner account exists, issuing bootstrap session");
            return self
                .issue_session(Account::bootstrap_owner(), self.config.session_ttl())
                .await;
        }

        let account = self.verify_credentials(&request).await?;

        if request.owner && !account.owner {
            warn!(username = %account.username, "Owner session requested by non-owner account");
            return Err(AppError::insufficient_privilege(
                "Account does not have owner privileges",
            ));
        }

        let ttl = if request.remember {
            self.config.remember_ttl()
        } else {
            self.config.session_ttl()
        };

        let session = self.issue_session(account.sanitized(), ttl).await?;
        info!(
            username = %session.account.username,
            owner = session.account.owner,
            remember = request.remember,
            "Login successful"
        );
        Ok(session)
    }

    /// Removes a single session. Returns whether it was live.
    pub async fn logout(&self, token: &str) -> bool {
        match self.sessions.remove(token).await {
            Some(account) => {
                info!(username = %account.username, "Logout completed");
                true
            }
            None => false,
        }
    }

    /// Revokes every session issued to `username`.
    pub async fn mass_invalidate(&self, username: &str) -> usize {
        self.sessions.mass_invalidate(username).await
    }

    /// Bootstrap applies only to exactly `admin`/`admin` while no owner exists.
    async fn is_bootstrap_login(&self, request: &LoginRequest) -> AppResult<bool> {
        if request.username != BOOTSTRAP_USERNAME || request.password != BOOTSTRAP_PASSWORD {
            return Ok(false);
        }

        let owners = with_deadline(
            self.config.lookup_timeout(),
            "get_accounts",
            self.store.get_accounts(&GetAccountsOptions::owners()),
        )
        .await?;
        Ok(owners.is_empty())
    }

    /// Both failure paths pay for one hash verification and return the same error.
    async fn verify_credentials(&self, request: &LoginRequest) -> AppResult<Account> {
        let account = with_deadline(
            self.config.lookup_timeout(),
            "get_account",
            self.store.get_account(&request.username),
        )
        .await?;

        let stored_hash = account.as_ref().map(|a| a.password_hash.as_str());
        let matched = self
            .hasher
            .verify_blocking(&request.password, stored_hash)
            .await?;

        match account {
            Some(account) if matched => Ok(account),
            _ => {
                warn!(username = %request.username, "Login failed: invalid credentials");
                Err(AppError::invalid_credentials())
            }
        }
    }

    async fn issue_session(&self, account: Account, ttl: Duration) -> AppResult<Session> {
        let lifetime = chrono::Duration::from_std(ttl)
            .map_err(|e| AppError::internal(format!("Session lifetime out of range: {e}")))?;

        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = Uuid::new_v4().to_string();
            let expires_at = Utc::now() + lifetime;
            if self.sessions.insert(&token, account.clone(), ttl).await {
                return Ok(Session {
                    token,
                    account,
                    expires_at,
                });
            }
        }

        Err(AppError::internal("Could not allocate a unique session token"))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use shelf_core::config::StorageBackend;
    use shelf_core::error::ErrorKind;
    use shelf_entity::account::NewAccount;

    use super::*;

    /// In-memory store whose failure mode can be chosen per test.
    #[derive(Debug, Default)]
    struct StubStore {
        accounts: Vec<Account>,
        fail: bool,
        delay: Option<Duration>,
    }

    impl StubStore {
        async fn pause(&self) -> AppResult<()> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(AppError::storage("database is unreachable"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CredentialStore for StubStore {
        fn backend(&self) -> StorageBackend {
            StorageBackend::Sqlite
        }

        async fn migrate(&self) -> AppResult<()> {
            Ok(())
        }

        async fn get_account(&self, username: &str) -> AppResult<Option<Account>> {
            self.pause().await?;
            Ok(self.accounts.iter().find(|a| a.username == username).cloned())
        }

        async fn get_accounts(&self, options: &GetAccountsOptions) -> AppResult<Vec<Account>> {
            self.pause().await?;
            Ok(self
                .accounts
                .iter()
                .filter(|a| !options.owners_only || a.owner)
                .map(Account::sanitized)
                .collect())
        }

        async fn create_account(&self, _account: &NewAccount) -> AppResult<Account> {
            Err(AppError::internal("read-only stub"))
        }

        async fn health_check(&self) -> AppResult<bool> {
            Ok(!self.fail)
        }
    }

    fn make_hasher() -> PasswordHasher {
        PasswordHasher::with_cost(1024, 1).unwrap()
    }

    fn make_service(store: StubStore) -> AuthService {
        AuthService::new(
            Arc::new(store),
            Arc::new(SessionStore::new()),
            make_hasher(),
            AuthConfig::default(),
        )
    }

    fn stored(hasher: &PasswordHasher, username: &str, password: &str, owner: bool) -> Account {
        Account {
            id: 7,
            username: username.to_string(),
            password_hash: hasher.hash_password(password).unwrap(),
            owner,
        }
    }

    fn request(username: &str, password: &str, owner: bool, remember: bool) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            owner,
            remember,
        }
    }

    #[tokio::test]
    async fn test_empty_credentials_are_rejected() {
        let service = make_service(StubStore::default());
        let err = service.login(request("", "secret", false, false)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = service.login(request("alice", "", false, false)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let service = make_service(StubStore {
            fail: true,
            ..StubStore::default()
        });
        let err = service
            .login(request("alice", "secret", false, false))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(service.sessions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_times_out() {
        let service = make_service(StubStore {
            delay: Some(Duration::from_secs(60)),
            ..StubStore::default()
        });
        let err = service
            .login(request("alice", "secret", false, false))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::StorageTimeout);
    }

    #[tokio::test]
    async fn test_bootstrap_lookup_failure_propagates() {
        let service = make_service(StubStore {
            fail: true,
            ..StubStore::default()
        });
        let err = service
            .login(request("admin", "admin", true, false))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_identical() {
        let hasher = make_hasher();
        let service = make_service(StubStore {
            accounts: vec![stored(&hasher, "alice", "secret", false)],
            ..StubStore::default()
        });

        let unknown = service
            .login(request("mallory", "secret", false, false))
            .await
            .unwrap_err();
        let wrong = service
            .login(request("alice", "guess", false, false))
            .await
            .unwrap_err();

        assert_eq!(unknown.kind, ErrorKind::InvalidCredentials);
        assert_eq!(wrong.kind, ErrorKind::InvalidCredentials);
        assert_eq!(unknown.message, wrong.message);
    }

    #[tokio::test]
    async fn test_owner_request_by_non_owner_is_refused() {
        let hasher = make_hasher();
        let service = make_service(StubStore {
            accounts: vec![stored(&hasher, "alice", "secret", false)],
            ..StubStore::default()
        });

        let err = service
            .login(request("alice", "secret", true, false))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InsufficientPrivilege);
        assert!(service.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_password_is_verified_before_owner_privilege() {
        let hasher = make_hasher();
        let service = make_service(StubStore {
            accounts: vec![stored(&hasher, "alice", "secret", false)],
            ..StubStore::default()
        });

        // A wrong password never reveals whether the account is an owner.
        let err = service
            .login(request("alice", "guess", true, false))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
        assert!(service.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_remember_extends_lifetime() {
        let hasher = make_hasher();
        let service = make_service(StubStore {
            accounts: vec![stored(&hasher, "alice", "secret", false)],
            ..StubStore::default()
        });

        let before = Utc::now();
        let short = service
            .login(request("alice", "secret", false, false))
            .await
            .unwrap();
        let long = service
            .login(request("alice", "secret", false, true))
            .await
            .unwrap();

        let hour = chrono::Duration::hours(1);
        let month = chrono::Duration::days(30);
        let slack = chrono::Duration::seconds(30);
        assert!(short.expires_at >= before + hour && short.expires_at <= before + hour + slack);
        assert!(long.expires_at >= before + month && long.expires_at <= before + month + slack);
    }

    #[tokio::test]
    async fn test_session_account_is_sanitized() {
        let hasher = make_hasher();
        let service = make_service(StubStore {
            accounts: vec![stored(&hasher, "alice", "secret", true)],
            ..StubStore::default()
        });

        let session = service
            .login(request("alice", "secret", true, false))
            .await
            .unwrap();
        assert!(session.account.password_hash.is_empty());
        assert!(session.account.owner);

        let cached = service.sessions().get(&session.token).await.unwrap();
        assert!(cached.password_hash.is_empty());
    }

    #[tokio::test]
    async fn test_bootstrap_disabled_once_an_owner_exists() {
        let hasher = make_hasher();
        let service = make_service(StubStore {
            accounts: vec![stored(&hasher, "root", "secret", true)],
            ..StubStore::default()
        });

        let err = service
            .login(request("admin", "admin", true, false))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_bootstrap_requires_exact_credentials() {
        let service = make_service(StubStore::default());
        let err = service
            .login(request("admin", "Admin", false, false))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_bootstrap_ignores_remember() {
        let service = make_service(StubStore::default());
        let before = Utc::now();
        let session = service
            .login(request("admin", "admin", false, true))
            .await
            .unwrap();
        assert!(session.account.owner);
        assert_eq!(session.account.id, 0);
        assert!(session.expires_at <= before + chrono::Duration::hours(1) + chrono::Duration::seconds(30));
        assert_eq!(service.sessions().tokens_for("admin").await, [session.token]);
    }

    #[tokio::test]
    async fn test_logout_and_mass_invalidate() {
        let hasher = make_hasher();
        let service = make_service(StubStore {
            accounts: vec![stored(&hasher, "alice", "secret", false)],
            ..StubStore::default()
        });

        let first = service.login(request("alice", "secret", false, false)).await.unwrap();
        let second = service.login(request("alice", "secret", false, false)).await.unwrap();
        let third = service.login(request("alice", "secret", false, false)).await.unwrap();

        assert!(service.logout(&first.token).await);
        assert!(!service.logout(&first.token).await);

        assert_eq!(service.mass_invalidate("alice").await, 2);
        assert!(service.sessions().get(&second.token).await.is_none());
        assert!(service.sessions().get(&third.token).await.is_none());
    }

    #[test]
    fn test_login_request_debug_hides_password() {
        let rendered = format!("{:?}", request("alice", "hunter2", false, false));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
