//! Start the Shelf server.

use clap::Args;

use shelf_core::config::AppConfig;
use shelf_core::config::app::normalize_root_path;
use shelf_core::result::AppResult;

use crate::output;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port used by the server
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address the server listens to
    #[arg(short, long)]
    pub address: Option<String>,

    /// Root path the API is served under
    #[arg(short = 'r', long)]
    pub webroot: Option<String>,

    /// Print an access log line per request
    #[arg(long)]
    pub log: Option<bool>,
}

impl ServeArgs {
    /// Apply command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(address) = &self.address {
            config.server.host = address.clone();
        }
        if let Some(webroot) = &self.webroot {
            config.server.root_path = webroot.clone();
        }
        if let Some(log) = self.log {
            config.server.access_log = log;
        }
        config.server.root_path = normalize_root_path(&config.server.root_path);
    }
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> AppResult<()> {
    args.apply(&mut config);
    shelf_api::init_logging(&config.logging);

    println!("Starting Shelf server...");
    output::print_kv("Address", &config.server.bind_address());
    output::print_kv("Root path", &config.server.root_path);
    output::print_kv("Backend", &config.database.backend.to_string());

    shelf_api::run_server(config).await
}
