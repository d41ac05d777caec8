//! Shelf Server: authentication and session core of the bookmark service.
//!
//! Main entry point: loads configuration, installs logging, and runs the
//! HTTP server until shutdown.

use shelf_core::config::AppConfig;
use shelf_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    shelf_api::init_logging(&config.logging);

    if let Err(e) = shelf_api::run_server(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load `config/default`, the `SHELF_ENV` overlay, then `SHELF__*` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SHELF_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}
