//! MySQL-backed credential store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::{MySql, QueryBuilder};
use tracing::{debug, info};

use shelf_core::config::{DatabaseConfig, StorageBackend};
use shelf_core::error::{AppError, ErrorKind};
use shelf_core::result::AppResult;
use shelf_entity::account::{Account, NewAccount};

use super::{CredentialStore, GetAccountsOptions, LIKE_ESCAPE_CLAUSE, storage_error};
use crate::connection::mask_password;
use crate::deadline::with_deadline;
use crate::migration::{MYSQL_MIGRATOR, run_migrations};

/// Credential store on a MySQL or MariaDB server.
#[derive(Debug, Clone)]
pub struct MySqlCredentialStore {
    pool: MySqlPool,
    query_timeout: Duration,
}

impl MySqlCredentialStore {
    /// Wrap an existing pool.
    pub fn new(pool: MySqlPool, query_timeout: Duration) -> Self {
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
            "Connecting to MySQL"
        );

        let pool = MySqlPoolOptions::new()
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

        info!("Successfully connected to MySQL");
        Ok(Self::new(pool, config.query_timeout()))
    }
}

#[async_trait]
impl CredentialStore for MySqlCredentialStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Mysql
    }

    async fn migrate(&self) -> AppResult<()> {
        run_migrations(&MYSQL_MIGRATOR, StorageBackend::Mysql, &self.pool).await
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
            let mut query = QueryBuilder::<MySql>::new(
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
            // No RETURNING clause in MySQL.
            let result =
                sqlx::query("INSERT INTO account (username, password_hash, owner) VALUES (?, ?, ?)")
                    .bind(&account.username)
                    .bind(&account.password_hash)
                    .bind(account.owner)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| storage_error("Failed to create account", e))?;

            Ok(Account {
                id: result.last_insert_id() as i64,
                username: account.username.clone(),
                password_hash: account.password_hash.clone(),
                owner: account.owner,
            })
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
