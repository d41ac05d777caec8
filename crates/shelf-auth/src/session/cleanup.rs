//! Background sweep of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use super::store::{SessionStore, SweepStats};

/// Periodically purges expired sessions and compacts the user index.
///
/// Expiry is already enforced on every lookup; the sweep only reclaims memory.
#[derive(Debug, Clone)]
pub struct SessionSweeper {
    sessions: Arc<SessionStore>,
    interval: Duration,
}

impl SessionSweeper {
    /// Creates a sweeper running every `interval`.
    pub fn new(sessions: Arc<SessionStore>, interval: Duration) -> Self {
        Self { sessions, interval }
    }

    /// Runs a single sweep.
    pub async fn run_once(&self) -> SweepStats {
        let stats = self.sessions.sweep().await;
        if stats.purged_sessions > 0 || stats.pruned_tokens > 0 {
            info!(
                purged = stats.purged_sessions,
                pruned = stats.pruned_tokens,
                "Session sweep completed"
            );
        }
        stats
    }

    /// Sweeps on every tick until the cancel signal flips to `true`.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "Session sweeper started");

        // A zero period would make `interval` panic.
        let mut ticker = time::interval(self.interval.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    // A dropped sender also means shutdown.
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.run_once().await;
                }
            }
        }

        info!("Session sweeper stopped");
    }
}
