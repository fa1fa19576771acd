//! In-memory revocation registry keyed by token identity (`jti`).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

/// Revoked token identities, each kept only until the token would have
/// expired on its own.
///
/// Owned and injected explicitly (usually as `Arc<TokenBlacklist>`); safe to
/// share across concurrent requests.
#[derive(Debug, Default)]
pub struct TokenBlacklist {
    entries: DashMap<String, DateTime<Utc>>,
}

impl TokenBlacklist {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Revoke `identity` until `expires_at`. Adding an identity twice is a no-op.
    pub fn add(&self, identity: impl Into<String>, expires_at: DateTime<Utc>) {
        self.add_at(identity, expires_at, Utc::now());
    }

    /// [`add`](Self::add) against an explicit clock. Entries already expired
    /// at `now` are dropped first.
    pub fn add_at(&self, identity: impl Into<String>, expires_at: DateTime<Utc>, now: DateTime<Utc>) {
        self.purge(now);
        self.entries.entry(identity.into()).or_insert(expires_at);
    }

    /// Revoke `identity` only if it is not already revoked.
    ///
    /// Returns `false` when another caller got there first. Rotation relies on
    /// this to make a refresh token single-use under concurrency.
    pub fn claim(&self, identity: impl Into<String>, expires_at: DateTime<Utc>) -> bool {
        self.claim_at(identity, expires_at, Utc::now())
    }

    pub fn claim_at(
        &self,
        identity: impl Into<String>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        self.purge(now);
        match self.entries.entry(identity.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(expires_at);
                true
            }
        }
    }

    /// Whether `identity` has been revoked.
    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    /// Drop entries whose `expires_at <= now`. Returns how many were removed.
    pub fn purge(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, expires_at| {
            let keep = *expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawn a periodic purge task.
    pub fn spawn_purge_task(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let blacklist = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = blacklist.purge(Utc::now());
                if removed > 0 {
                    debug!(removed, remaining = blacklist.len(), "purged blacklist");
                }
            }
        })
    }
}
