//! The credential storage contract and its SQL implementations.

pub mod mysql;
pub mod postgres;
pub mod sqlite;

use async_trait::async_trait;

use shelf_core::config::StorageBackend;
use shelf_core::error::{AppError, ErrorKind};
use shelf_core::result::AppResult;
use shelf_entity::account::{Account, NewAccount};

pub use mysql::MySqlCredentialStore;
pub use postgres::PgCredentialStore;
pub use sqlite::SqliteCredentialStore;

/// Escape character for keyword patterns. Backslash is avoided because
/// MySQL string literals treat it specially.
const LIKE_ESCAPE: char = '!';

/// Clause appended after every keyword `LIKE` comparison.
pub(crate) const LIKE_ESCAPE_CLAUSE: &str = " ESCAPE '!'";

/// Filter for [`CredentialStore::get_accounts`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetAccountsOptions {
    /// Substring that usernames must contain. Empty or `None` disables the filter.
    pub keyword: Option<String>,
    /// Only return accounts with owner privileges.
    pub owners_only: bool,
}

impl GetAccountsOptions {
    /// Options selecting every owner account.
    pub fn owners() -> Self {
        Self {
            keyword: None,
            owners_only: true,
        }
    }

    /// The keyword as a `LIKE` pattern, if one is set. Wildcards in the
    /// keyword match literally; use with [`LIKE_ESCAPE_CLAUSE`].
    pub(crate) fn like_pattern(&self) -> Option<String> {
        let keyword = self.keyword.as_deref().filter(|k| !k.is_empty())?;
        let mut pattern = String::with_capacity(keyword.len() + 2);
        pattern.push('%');
        for c in keyword.chars() {
            if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
                pattern.push(LIKE_ESCAPE);
            }
            pattern.push(c);
        }
        pattern.push('%');
        Some(pattern)
    }
}

/// Read/write access to persisted accounts.
///
/// Every operation may fail with a `Storage` error, or with
/// `StorageTimeout` when the backend misses its deadline. Implementations
/// must be safe to call from many tasks at once.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// The engine behind this store.
    fn backend(&self) -> StorageBackend;

    /// Apply all pending schema migrations. Idempotent.
    async fn migrate(&self) -> AppResult<()>;

    /// Look up one account by exact username, password hash included.
    async fn get_account(&self, username: &str) -> AppResult<Option<Account>>;

    /// List accounts ordered by username. Password hashes are cleared.
    async fn get_accounts(&self, options: &GetAccountsOptions) -> AppResult<Vec<Account>>;

    /// Persist a new account. A taken username yields `Conflict`.
    async fn create_account(&self, account: &NewAccount) -> AppResult<Account>;

    /// Check connectivity with a trivial query.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Translate a sqlx failure into the storage error taxonomy.
pub(crate) fn storage_error(context: &str, err: sqlx::Error) -> AppError {
    let kind = match &err {
        sqlx::Error::PoolTimedOut => ErrorKind::StorageTimeout,
        sqlx::Error::Database(db) if db.is_unique_violation() => ErrorKind::Conflict,
        _ => ErrorKind::Storage,
    };
    let message = match kind {
        ErrorKind::StorageTimeout => format!("{context}: timed out waiting for a connection"),
        ErrorKind::Conflict => format!("{context}: username already exists"),
        _ => format!("{context}: {err}"),
    };
    AppError::with_source(kind, message, err)
}
