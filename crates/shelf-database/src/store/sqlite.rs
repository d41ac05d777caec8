//! SQLite-backed credential store.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use tracing::{debug, info};

use shelf_core::config::{DatabaseConfig, StorageBackend};
use shelf_core::error::{AppError, ErrorKind};
use shelf_core::result::AppResult;
use shelf_entity::account::{Account, NewAccount};

use super::{CredentialStore, GetAccountsOptions, LIKE_ESCAPE_CLAUSE, storage_error};
use crate::deadline::with_deadline;
use crate::migration::{SQLITE_MIGRATOR, run_migrations};

/// Credential store on an embedded SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl SqliteCredentialStore {
    /// Wrap an existing pool.
    pub fn new(pool: SqlitePool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Open (creating if needed) the database file named by `config.url`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Invalid SQLite URL '{}': {e}", config.url),
                    e,
                )
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        info!(
            url = %config.url,
            max_connections = config.max_connections,
            "Connecting to SQLite"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(config.idle_timeout())
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open SQLite database: {e}"),
                    e,
                )
            })?;

        info!("Successfully opened SQLite database");
        Ok(Self::new(pool, config.query_timeout()))
    }

    /// A private in-memory database. Limited to one connection so every
    /// query sees the same database.
    pub async fn in_memory(query_timeout: Duration) -> AppResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| storage_error("Failed to open in-memory SQLite", e))?;
        Ok(Self::new(pool, query_timeout))
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Sqlite
    }

    async fn migrate(&self) -> AppResult<()> {
        run_migrations(&SQLITE_MIGRATOR, StorageBackend::Sqlite, &self.pool).await
    }

    async fn get_account(&self, username: &str) -> AppResult<Option<Account>> {
        with_deadline(self.query_timeout, "get_account", async {
            sqlx::query_as::<_, Account>(
                "SELECT id, username, password_hash, owner FROM account WHERE username = ?",
            )
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to find account", e))
        })
        .await
    }

    async fn get_accounts(&self, options: &GetAccountsOptions) -> AppResult<Vec<Account>> {
        with_deadline(self.query_timeout, "get_accounts", async {
            let mut query = QueryBuilder::<Sqlite>::new(
                "SELECT id, username, password_hash, owner FROM account WHERE 1 = 1",
            );
            if let Some(pattern) = options.like_pattern() {
                query
                    .push(" AND username LIKE ")
                    .push_bind(pattern)
                    .push(LIKE_ESCAPE_CLAUSE);
            }
            if options.owners_only {
                query.push(" AND owner = ").push_bind(true);
            }
            query.push(" ORDER BY username ASC");

            let accounts = query
                .build_query_as::<Account>()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| storage_error("Failed to list accounts", e))?;

            debug!(count = accounts.len(), "Listed accounts");
            Ok(accounts.iter().map(Account::sanitized).collect())
        })
        .await
    }

    async fn create_account(&self, account: &NewAccount) -> AppResult<Account> {
        with_deadline(self.query_timeout, "create_account", async {
            sqlx::query_as::<_, Account>(
                "INSERT INTO account (username, password_hash, owner) VALUES (?, ?, ?) \
                 RETURNING id, username, password_hash, owner",
            )
            .bind(&account.username)
            .bind(&account.password_hash)
            .bind(account.owner)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to create account", e))
        })
        .await
    }

    async fn health_check(&self) -> AppResult<bool> {
        with_deadline(self.query_timeout, "health_check", async {
            sqlx::query_scalar::<_, i32>("SELECT 1")
                .fetch_one(&self.pool)
                .await
                .map(|v| v == 1)
                .map_err(|e| storage_error("Health check failed", e))
        })
        .await
    }
}
