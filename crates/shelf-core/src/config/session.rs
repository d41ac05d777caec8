//! Session cache maintenance configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session cache maintenance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Interval between background sweeps of expired sessions, in minutes.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sweep_interval_minutes: default_sweep_interval(),
        }
    }
}

impl SessionConfig {
    /// Sweep interval as a [`Duration`].
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes * 60)
    }
}

fn default_sweep_interval() -> u64 {
    10
}
