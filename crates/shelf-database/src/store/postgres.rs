//! PostgreSQL-backed credential store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, info};

use shelf_core::config::{DatabaseConfig, StorageBackend};
use shelf_core::error::{AppError, ErrorKind};
use shelf_core::result::AppResult;
use shelf_entity::account::{Account, NewAccount};

use super::{CredentialStore, GetAccountsOptions, LIKE_ESCAPE_CLAUSE, storage_error};
use crate::connection::mask_password;
use crate::deadline::with_deadline;
use crate::migration::{POSTGRES_MIGRATOR, run_migrations};

/// Credential store on a PostgreSQL server.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgCredentialStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Connect a pool using the database configuration.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %mask_password(&config.url),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(config.idle_timeout())
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        info!("Successfully connected to PostgreSQL");
        Ok(Self::new(pool, config.query_timeout()))
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Postgres
    }

    async fn migrate(&self) -> AppResult<()> {
        run_migrations(&POSTGRES_MIGRATOR, StorageBackend::Postgres, &self.pool).await
    }

    async fn get_account(&self, username: &str) -> AppResult<Option<Account>> {
        with_deadline(self.query_timeout, "get_account", async {
            sqlx::query_as::<_, Account>(
                "SELECT id, username, password_hash, owner FROM account WHERE username = $1",
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
            let mut query = QueryBuilder::<Postgres>::new(
                "SELECT id, username, password_hash, owner FROM account WHERE 1 = 1",
            );
            // ILIKE keeps the filter case-insensitive like the other dialects.
            if let Some(pattern) = options.like_pattern() {
                query
                    .push(" AND username ILIKE ")
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
                "INSERT INTO account (username, password_hash, owner) VALUES ($1, $2, $3) \
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
