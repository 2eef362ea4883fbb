//! Cache tiers for issued authentication tokens.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// A cache tier for issued authentication tokens.
///
/// The token issuer consults a primary tier (usually an in-process
/// [`MemoryTokenCache`]) and an optional secondary tier, typically backed by
/// external storage so tokens survive process restarts. Implementations own
/// their expiry discipline: `get` must never return an entry whose ttl has
/// elapsed.
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Look up a cached token. Expired entries are treated as absent.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a token for at most `ttl`.
    async fn put(&self, key: &str, token: String, ttl: Duration);
}

/// In-process token cache.
///
/// The default primary tier. Sharing one instance across client instances
/// (behind an `Arc`) shares issued tokens across them.
#[derive(Default)]
pub struct MemoryTokenCache {
    entries: RwLock<HashMap<String, CachedEntry>>,
}

struct CachedEntry {
    token: String,
    deadline: Instant,
}

impl MemoryTokenCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenCache for MemoryTokenCache {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.deadline > Instant::now())
            .map(|entry| entry.token.clone())
    }

    async fn put(&self, key: &str, token: String, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.deadline > now);
        entries.insert(
            key.to_string(),
            CachedEntry {
                token,
                deadline: now + ttl,
            },
        );
    }
}
