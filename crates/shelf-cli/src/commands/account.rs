//! Account management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use shelf_auth::PasswordHasher;
use shelf_core::config::AppConfig;
use shelf_core::error::AppError;
use shelf_core::result::AppResult;
use shelf_database::GetAccountsOptions;
use shelf_entity::account::{Account, NewAccount};

use crate::output::{self, OutputFormat};

/// Arguments for account commands
#[derive(Debug, Args)]
pub struct AccountArgs {
    /// Account subcommand
    #[command(subcommand)]
    pub command: AccountCommand,
}

/// Account subcommands
#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Create a new account
    Add {
        /// Username
        username: String,
        /// Grant owner privileges
        #[arg(long)]
        owner: bool,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// List accounts
    List {
        /// Only usernames containing this text
        #[arg(short, long)]
        keyword: Option<String>,
        /// Only owner accounts
        #[arg(long)]
        owners: bool,
    },
}

/// Account row for table output
#[derive(Debug, Serialize, Tabled)]
struct AccountRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Owner")]
    owner: bool,
}

impl From<Account> for AccountRow {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            owner: account.owner,
        }
    }
}

/// Execute account commands
pub async fn execute(args: &AccountArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let store = super::open_store(config).await?;
    store.migrate().await?;

    match &args.command {
        AccountCommand::Add {
            username,
            owner,
            password,
        } => {
            if username.is_empty() {
                return Err(AppError::validation("Username must not be empty"));
            }

            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
            };
            if password.is_empty() {
                return Err(AppError::validation("Password must not be empty"));
            }

            let hasher = PasswordHasher::new()?;
            let account = store
                .create_account(&NewAccount {
                    username: username.clone(),
                    password_hash: hasher.hash_password(&password)?,
                    owner: *owner,
                })
                .await?;

            output::print_success(&format!(
                "Account '{}' created (id: {}, owner: {})",
                account.username, account.id, account.owner
            ));

            if !account.owner {
                let owners = store.get_accounts(&GetAccountsOptions::owners()).await?;
                if owners.is_empty() {
                    output::print_warning(
                        "No owner account exists yet; the admin/admin bootstrap login stays enabled.",
                    );
                }
            }
        }
        AccountCommand::List { keyword, owners } => {
            let accounts = store
                .get_accounts(&GetAccountsOptions {
                    keyword: keyword.clone(),
                    owners_only: *owners,
                })
                .await?;
            let rows: Vec<AccountRow> = accounts.into_iter().map(AccountRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
