//! Conversation state storage.
//!
//! Redis keeps state across restarts and replicas. The in-memory store is
//! used when Redis is unreachable at startup.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

use super::cache::Cache;
use crate::config::CONVERSATION_TTL_SECONDS;
use crate::domain::{Conversation, ConversationKey};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Per (chat, user) conversation state.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the conversation; a missing or expired one is the default.
    async fn load(&self, key: ConversationKey) -> AppResult<Conversation>;

    /// Persist the conversation, refreshing its TTL.
    async fn save(&self, key: ConversationKey, conversation: Conversation) -> AppResult<()>;

    /// Reset the conversation.
    async fn clear(&self, key: ConversationKey) -> AppResult<()>;

    /// Check the backend is reachable.
    async fn ping(&self) -> AppResult<()>;

    /// Backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Redis-backed state under the `fsm:` prefix
pub struct RedisStateStore {
    cache: Cache,
}

impl RedisStateStore {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl StateStore for RedisStateStore {
    async fn load(&self, key: ConversationKey) -> AppResult<Conversation> {
        Ok(self
            .cache
            .get::<Conversation>(&key.cache_key())
            .await?
            .unwrap_or_default())
    }

    async fn save(&self, key: ConversationKey, conversation: Conversation) -> AppResult<()> {
        if conversation.is_empty() {
            return self.clear(key).await;
        }
        self.cache
            .set_with_ttl(&key.cache_key(), &conversation, CONVERSATION_TTL_SECONDS)
            .await
    }

    async fn clear(&self, key: ConversationKey) -> AppResult<()> {
        self.cache.delete(&key.cache_key()).await
    }

    async fn ping(&self) -> AppResult<()> {
        self.cache.ping().await
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// Process-local state, lost on restart
pub struct MemoryStateStore {
    entries: DashMap<ConversationKey, (Conversation, Instant)>,
    ttl: Duration,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(CONVERSATION_TTL_SECONDS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, key: ConversationKey) -> AppResult<Conversation> {
        let expired = match self.entries.get(&key) {
            Some(entry) if entry.1.elapsed() <= self.ttl => return Ok(entry.0.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(&key);
        }
        Ok(Conversation::default())
    }

    async fn save(&self, key: ConversationKey, conversation: Conversation) -> AppResult<()> {
        if conversation.is_empty() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, (conversation, Instant::now()));
        }
        Ok(())
    }

    async fn clear(&self, key: ConversationKey) -> AppResult<()> {
        self.entries.remove(&key);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
