//! CLI command definitions and dispatch.

pub mod account;
pub mod migrate;
pub mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use shelf_core::config::{AppConfig, StorageBackend};
use shelf_core::error::AppError;
use shelf_core::result::AppResult;
use shelf_database::CredentialStore;

use crate::output::OutputFormat;

/// Directory created next to the executable in portable mode.
const PORTABLE_DATA_DIR: &str = "shelf-data";

/// Shelf: bookmark service authentication core
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Keep the SQLite database next to the executable
    #[arg(long, global = true)]
    pub portable: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the HTTP API
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Account management
    Account(account::AccountArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> AppResult<()> {
        let config = load_config(&self.config, self.portable)?;

        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Account(args) => account::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: load configuration from file, applying `--portable`
pub fn load_config(config_path: &str, portable: bool) -> AppResult<AppConfig> {
    let mut config = AppConfig::load_file(config_path)?;

    if portable {
        config.database.backend = StorageBackend::Sqlite;
        config.database.url = portable_database_url()?;
    }

    Ok(config)
}

/// Helper: connect to the configured credential store
pub async fn open_store(config: &AppConfig) -> AppResult<Arc<dyn CredentialStore>> {
    shelf_database::open_store(&config.database).await
}

/// SQLite URL for `<exe_dir>/shelf-data/shelf.db`.
fn portable_database_url() -> AppResult<String> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .map(PathBuf::from)
        .ok_or_else(|| AppError::configuration("Executable has no parent directory"))?;
    let path = dir.join(PORTABLE_DATA_DIR).join("shelf.db");
    Ok(format!("sqlite://{}", path.display()))
}
