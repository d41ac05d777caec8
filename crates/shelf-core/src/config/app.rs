//! HTTP server configuration.

use serde::{Deserialize, Serialize};

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server listens on. Empty means all interfaces.
    #[serde(default)]
    pub host: String,
    /// Port the server listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Root path the API is mounted under.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Whether to emit a per-request access log line.
    #[serde(default = "default_true")]
    pub access_log: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            root_path: default_root_path(),
            access_log: true,
        }
    }
}

impl ServerConfig {
    /// Socket address string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        let host = if self.host.is_empty() {
            "0.0.0.0"
        } else {
            self.host.as_str()
        };
        format!("{host}:{}", self.port)
    }
}

/// Normalize a web root so it always starts and ends with `/`.
pub fn normalize_root_path(root: &str) -> String {
    if root.is_empty() {
        return "/".to_string();
    }

    let mut path = root.to_string();
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}

fn default_port() -> u16 {
    8080
}

fn default_root_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}
