//! Embedded, per-dialect migration sets.
//!
//! sqlx records each applied version and its checksum in `_sqlx_migrations`,
//! so re-running a fully applied set is a no-op and an edited migration is
//! rejected.

use std::ops::Deref;

use sqlx::Acquire;
use sqlx::migrate::{Migrate, Migrator};
use tracing::info;

use shelf_core::config::StorageBackend;
use shelf_core::error::{AppError, ErrorKind};

/// Migrations for the embedded SQLite backend.
pub static SQLITE_MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Migrations for the PostgreSQL backend.
pub static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("../../migrations/postgres");

/// Migrations for the MySQL backend.
pub static MYSQL_MIGRATOR: Migrator = sqlx::migrate!("../../migrations/mysql");

/// Run all pending migrations of `migrator` against `conn`.
pub async fn run_migrations<'a, A>(
    migrator: &Migrator,
    backend: StorageBackend,
    conn: A,
) -> Result<(), AppError>
where
    A: Acquire<'a>,
    <A::Connection as Deref>::Target: Migrate,
{
    info!(%backend, available = migrator.iter().count(), "Running database migrations...");

    migrator.run(conn).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to run {backend} migrations: {e}"),
            e,
        )
    })?;

    info!(%backend, "Database migrations completed successfully");
    Ok(())
}
