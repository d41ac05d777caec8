//! The session cache and its per-user index, kept consistent under one lock.

use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

use shelf_cache::TtlCache;
use shelf_entity::account::Account;

use super::index::UserSessionIndex;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Expired sessions removed from the cache.
    pub purged_sessions: usize,
    /// Expired tokens dropped from the user index.
    pub pruned_tokens: usize,
}

/// Live sessions keyed by token, plus the username → tokens index.
///
/// Every operation that touches both structures holds the index write lock
/// for its whole duration. Lookups hold the read lock, so they never observe
/// a mass invalidation half done.
#[derive(Debug, Default)]
pub struct SessionStore {
    cache: TtlCache<String, Account>,
    index: RwLock<UserSessionIndex>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a session and index its token under the account's username.
    ///
    /// Returns `false`, changing nothing, if `token` is already live.
    pub async fn insert(&self, token: &str, account: Account, ttl: Duration) -> bool {
        let mut index = self.index.write().await;
        let now = Instant::now();
        let username = account.username.clone();

        // Cache entry and index entry share one expiry instant.
        if !self.cache.insert_if_absent(token.to_string(), account, ttl, now) {
            return false;
        }
        index.add(&username, token.to_string(), now + ttl, now);
        debug!(username = %username, ttl_secs = ttl.as_secs(), "Session cached");
        true
    }

    /// The account bound to `token`, if the session is live.
    pub async fn get(&self, token: &str) -> Option<Account> {
        let _index = self.index.read().await;
        self.cache.get(token)
    }

    /// Remove one session. Returns the account it belonged to, if it was live.
    ///
    /// An expired entry not yet swept is still unindexed.
    pub async fn remove(&self, token: &str) -> Option<Account> {
        let mut index = self.index.write().await;
        let now = Instant::now();
        let entry = self.cache.remove_entry(token)?;
        index.remove_token(&entry.value.username, token);
        (!entry.is_expired_at(now)).then_some(entry.value)
    }

    /// Revoke every session issued to `username` and clear its index entry.
    ///
    /// Returns how many of the revoked sessions were still live.
    pub async fn mass_invalidate(&self, username: &str) -> usize {
        let mut index = self.index.write().await;
        let now = Instant::now();
        let revoked = index
            .take(username)
            .iter()
            .filter(|token| self.cache.remove(token.as_str(), now).is_some())
            .count();
        info!(username, revoked, "Sessions invalidated");
        revoked
    }

    /// Live tokens currently issued to `username`, oldest first.
    pub async fn tokens_for(&self, username: &str) -> Vec<String> {
        self.index.read().await.tokens(username, Instant::now())
    }

    /// Purge expired sessions from the cache and compact the index.
    pub async fn sweep(&self) -> SweepStats {
        let mut index = self.index.write().await;
        let now = Instant::now();
        let stats = SweepStats {
            purged_sessions: self.cache.purge_expired(now),
            pruned_tokens: index.compact(now),
        };
        debug!(
            purged = stats.purged_sessions,
            pruned = stats.pruned_tokens,
            remaining = self.cache.len(),
            indexed_users = index.user_count(),
            indexed_tokens = index.token_count(),
            "Session sweep finished"
        );
        stats
    }

    /// Number of cached sessions, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether no sessions are cached.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn account(username: &str, owner: bool) -> Account {
        Account {
            id: 1,
            username: username.to_string(),
            password_hash: String::new(),
            owner,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_and_get() {
        let store = SessionStore::new();
        assert!(store.insert("t1", account("alice", false), Duration::from_secs(60)).await);

        let found = store.get("t1").await.unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(store.tokens_for("alice").await, ["t1"]);
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_token_is_rejected() {
        let store = SessionStore::new();
        assert!(store.insert("t1", account("alice", false), Duration::from_secs(60)).await);
        assert!(!store.insert("t1", account("bob", true), Duration::from_secs(60)).await);

        assert_eq!(store.get("t1").await.unwrap().username, "alice");
        assert!(store.tokens_for("bob").await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_is_enforced_before_sweep() {
        let store = SessionStore::new();
        store.insert("t1", account("alice", false), Duration::from_secs(60)).await;

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(store.get("t1").await.is_none());
        assert!(store.tokens_for("alice").await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mass_invalidate_removes_all_user_tokens() {
        let store = SessionStore::new();
        for token in ["a1", "a2", "a3"] {
            store.insert(token, account("alice", false), Duration::from_secs(60)).await;
        }
        store.insert("b1", account("bob", false), Duration::from_secs(60)).await;

        assert_eq!(store.mass_invalidate("alice").await, 3);
        for token in ["a1", "a2", "a3"] {
            assert!(store.get(token).await.is_none());
        }
        assert!(store.tokens_for("alice").await.is_empty());
        assert!(store.get("b1").await.is_some());
        assert_eq!(store.mass_invalidate("nobody").await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mass_invalidate_counts_only_live_sessions() {
        let store = SessionStore::new();
        store.insert("short", account("alice", false), Duration::from_secs(1)).await;
        store.insert("long", account("alice", false), Duration::from_secs(60)).await;
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(store.mass_invalidate("alice").await, 1);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_single_session() {
        let store = SessionStore::new();
        store.insert("t1", account("alice", false), Duration::from_secs(60)).await;
        store.insert("t2", account("alice", false), Duration::from_secs(60)).await;

        assert_eq!(store.remove("t1").await.unwrap().username, "alice");
        assert!(store.remove("t1").await.is_none());
        assert_eq!(store.tokens_for("alice").await, ["t2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_expired_session_still_unindexes_it() {
        let store = SessionStore::new();
        store.insert("t1", account("alice", false), Duration::from_secs(1)).await;
        store.insert("t2", account("alice", false), Duration::from_secs(60)).await;
        tokio::time::advance(Duration::from_secs(2)).await;

        assert!(store.remove("t1").await.is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.index.read().await.token_count(), 1);
        assert_eq!(store.tokens_for("alice").await, ["t2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_and_index_expire_at_the_same_instant() {
        let store = SessionStore::new();
        store.insert("t1", account("alice", false), Duration::from_secs(10)).await;

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(store.sweep().await, SweepStats::default());
        assert!(store.get("t1").await.is_some());
        assert_eq!(store.tokens_for("alice").await, ["t1"]);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(
            store.sweep().await,
            SweepStats {
                purged_sessions: 1,
                pruned_tokens: 1,
            }
        );
        assert!(store.is_empty());
        assert_eq!(store.index.read().await.token_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_purges_cache_and_index() {
        let store = SessionStore::new();
        store.insert("short", account("alice", false), Duration::from_secs(1)).await;
        store.insert("long", account("bob", false), Duration::from_secs(600)).await;
        tokio::time::advance(Duration::from_secs(5)).await;

        let stats = store.sweep().await;
        assert_eq!(
            stats,
            SweepStats {
                purged_sessions: 1,
                pruned_tokens: 1,
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_and_invalidate_stay_consistent() {
        let store = Arc::new(SessionStore::new());

        let inserts = (0..32).map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .insert(&format!("t{i}"), account("alice", false), Duration::from_secs(60))
                    .await
            })
        });
        let invalidate = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.mass_invalidate("alice").await })
        };

        for handle in inserts {
            assert!(handle.await.unwrap());
        }
        invalidate.await.unwrap();

        // Whatever interleaving happened, cache and index agree.
        let indexed = store.tokens_for("alice").await;
        assert_eq!(indexed.len(), store.len());
        for token in &indexed {
            assert!(store.get(token).await.is_some());
        }
    }
}
