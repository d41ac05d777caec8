//! Concurrent TTL cache on top of `DashMap`.

use std::borrow::Borrow;
use std::hash::Hash;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;
use tracing::debug;

use crate::entry::CacheEntry;

/// Key/value cache where every entry carries its own time-to-live.
///
/// All methods take `&self`; the map is sharded, so reads on different keys
/// never contend. An expired entry is never returned, even before it has
/// been physically removed.
///
/// Writers pass the clock reading explicitly so that a caller keeping
/// another structure in step with the cache can use the same instant for
/// both.
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a clone of the live value for `key`.
    ///
    /// An expired entry found here is removed on the spot.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired_at(now) {
                return Some(entry.value.clone());
            }
        }
        // Drop the read guard before taking the shard's write lock.
        self.entries.remove_if(key, |_, entry| entry.is_expired_at(now));
        None
    }

    /// Insert only if no entry for `key` is live at `now`. Returns whether
    /// the value was stored. An expired entry under the same key is replaced.
    pub fn insert_if_absent(&self, key: K, value: V, ttl: Duration, now: Instant) -> bool {
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired_at(now) {
                    occupied.insert(CacheEntry::new(value, ttl, now));
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::new(value, ttl, now));
                true
            }
        }
    }

    /// Remove `key` and return its entry whether or not it had expired.
    pub fn remove_entry<Q>(&self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.remove(key).map(|(_, entry)| entry)
    }

    /// Remove `key`, returning its value if it was still live at `now`.
    pub fn remove<Q>(&self, key: &Q, now: Instant) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.remove_entry(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value)
    }

    /// Drop every entry expired at `now`. Returns how many were removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!(purged, "Purged expired cache entries");
        }
        purged
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cache() -> TtlCache<String, u32> {
        TtlCache::new()
    }

    fn put(cache: &TtlCache<String, u32>, key: &str, value: u32, secs: u64) -> bool {
        cache.insert_if_absent(key.into(), value, Duration::from_secs(secs), Instant::now())
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_before_and_after_expiry() {
        let cache = make_cache();
        put(&cache, "a", 1, 60);

        assert_eq!(cache.get("a"), Some(1));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("a"), Some(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 0, "expired entry is removed lazily");
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_if_absent() {
        let cache = make_cache();
        assert!(put(&cache, "a", 1, 5));
        assert!(!put(&cache, "a", 2, 5));
        assert_eq!(cache.get("a"), Some(1));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(put(&cache, "a", 3, 5));
        assert_eq!(cache.get("a"), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_reports_only_live_values() {
        let cache = make_cache();
        put(&cache, "live", 1, 60);
        put(&cache, "stale", 2, 1);
        tokio::time::advance(Duration::from_secs(2)).await;

        let now = Instant::now();
        assert_eq!(cache.remove("live", now), Some(1));
        assert_eq!(cache.remove("stale", now), None);
        assert_eq!(cache.remove("missing", now), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_entry_returns_expired_entries() {
        let cache = make_cache();
        put(&cache, "stale", 2, 1);
        tokio::time::advance(Duration::from_secs(2)).await;

        let entry = cache.remove_entry("stale").unwrap();
        assert_eq!(entry.value, 2);
        assert!(entry.is_expired_at(Instant::now()));
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = make_cache();
        put(&cache, "short", 1, 1);
        put(&cache, "long", 2, 100);
        put(&cache, "mid", 3, 10);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(cache.purge_expired(Instant::now()), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("long"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_uses_the_given_instant() {
        let cache = make_cache();
        let start = Instant::now();
        cache.insert_if_absent("a".into(), 1, Duration::from_secs(10), start);

        assert_eq!(cache.purge_expired(start + Duration::from_secs(9)), 0);
        assert_eq!(cache.purge_expired(start + Duration::from_secs(10)), 1);
    }
}
