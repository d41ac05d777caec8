//! Database migration management commands.

use clap::{Args, Subcommand};

use shelf_core::config::AppConfig;
use shelf_core::result::AppResult;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> AppResult<()> {
    let store = super::open_store(config).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running {} migrations...", store.backend());
            store.migrate().await?;
            output::print_success("All migrations applied successfully.");
        }
    }

    Ok(())
}
