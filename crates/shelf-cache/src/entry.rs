//! A single cached value with its lifetime.

use std::time::Duration;

use tokio::time::Instant;

/// Value plus the instant it stops being visible.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value.
    pub value: V,
    /// When the entry was written.
    pub inserted_at: Instant,
    /// How long it stays visible after `inserted_at`.
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Create an entry whose lifetime starts at `now`.
    pub fn new(value: V, ttl: Duration, now: Instant) -> Self {
        Self {
            value,
            inserted_at: now,
            ttl,
        }
    }

    /// The instant after which the entry is expired.
    pub fn expires_at(&self) -> Instant {
        self.inserted_at + self.ttl
    }

    /// Whether the entry is expired at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }
}
