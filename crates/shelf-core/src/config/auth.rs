//! Authentication configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Login and session lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of a regular session in minutes.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: u64,
    /// Lifetime of a "remember me" session in days.
    #[serde(default = "default_remember_ttl")]
    pub remember_ttl_days: u64,
    /// Deadline applied to each credential lookup made during login, in seconds.
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_minutes: default_session_ttl(),
            remember_ttl_days: default_remember_ttl(),
            lookup_timeout_seconds: default_lookup_timeout(),
        }
    }
}

impl AuthConfig {
    /// TTL for a session created without "remember me".
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_minutes * 60)
    }

    /// TTL for a session created with "remember me".
    pub fn remember_ttl(&self) -> Duration {
        Duration::from_secs(self.remember_ttl_days * 24 * 60 * 60)
    }

    /// Deadline for a single credential lookup.
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_seconds)
    }
}

fn default_session_ttl() -> u64 {
    60
}

fn default_remember_ttl() -> u64 {
    30
}

fn default_lookup_timeout() -> u64 {
    5
}
