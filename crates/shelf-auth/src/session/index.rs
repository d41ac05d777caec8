//! Username → issued tokens, for mass invalidation.

use std::collections::HashMap;

use tokio::time::Instant;

/// A token together with the instant its cache entry expires.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IssuedToken {
    token: String,
    expires_at: Instant,
}

/// Tracks every token issued to each username, in issue order.
///
/// Expired tokens are dropped from a user's entry whenever that entry is
/// written, filtered out on read, and removed everywhere by [`compact`].
///
/// The index itself is not synchronized; [`SessionStore`] guards it together
/// with the session cache.
///
/// [`compact`]: UserSessionIndex::compact
/// [`SessionStore`]: crate::session::SessionStore
#[derive(Debug, Default)]
pub struct UserSessionIndex {
    entries: HashMap<String, Vec<IssuedToken>>,
}

impl UserSessionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `token` to the user's entry, creating it if absent.
    pub fn add(&mut self, username: &str, token: String, expires_at: Instant, now: Instant) {
        let tokens = self.entries.entry(username.to_string()).or_default();
        tokens.retain(|t| t.expires_at > now);
        tokens.push(IssuedToken { token, expires_at });
    }

    /// Live tokens issued to `username`, oldest first.
    pub fn tokens(&self, username: &str, now: Instant) -> Vec<String> {
        self.entries
            .get(username)
            .map(|tokens| {
                tokens
                    .iter()
                    .filter(|t| t.expires_at > now)
                    .map(|t| t.token.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remove and return the user's whole entry, expired tokens included.
    pub fn take(&mut self, username: &str) -> Vec<String> {
        self.entries
            .remove(username)
            .map(|tokens| tokens.into_iter().map(|t| t.token).collect())
            .unwrap_or_default()
    }

    /// Remove a single token from the user's entry. Returns whether it was present.
    pub fn remove_token(&mut self, username: &str, token: &str) -> bool {
        let Some(tokens) = self.entries.get_mut(username) else {
            return false;
        };
        let before = tokens.len();
        tokens.retain(|t| t.token != token);
        let removed = tokens.len() != before;
        if tokens.is_empty() {
            self.entries.remove(username);
        }
        removed
    }

    /// Drop expired tokens and empty entries. Returns how many tokens were dropped.
    pub fn compact(&mut self, now: Instant) -> usize {
        let mut dropped = 0;
        self.entries.retain(|_, tokens| {
            let before = tokens.len();
            tokens.retain(|t| t.expires_at > now);
            dropped += before - tokens.len();
            !tokens.is_empty()
        });
        dropped
    }

    /// Number of usernames with at least one tracked token.
    pub fn user_count(&self) -> usize {
        self.entries.len()
    }

    /// Total tracked tokens across all users.
    pub fn token_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
