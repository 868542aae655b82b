//! Redis access for conversation state and job locks.

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError, Script};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::config::{Config, CACHE_PREFIX_LOCK};
use crate::errors::{AppError, AppResult};

/// Deletes the lock key only while it still holds our token.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
end
return 0
"#;

/// Shared Redis connection. Clones reuse the same multiplexed connection.
#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
}

impl Cache {
    /// Connect and make sure the server answers `PING`.
    ///
    /// The caller decides what to do when Redis is down; `run` falls back
    /// to in-memory state.
    pub async fn try_connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let cache = Self {
            conn: ConnectionManager::new(client).await?,
        };
        cache.raw_ping().await?;

        tracing::info!("Redis connected");
        Ok(cache)
    }

    async fn raw_ping(&self) -> Result<(), RedisError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    pub async fn ping(&self) -> AppResult<()> {
        Ok(self.raw_ping().await?)
    }

    /// Read a JSON value.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;
        raw.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| AppError::internal(format!("Corrupt value under {}: {}", key, e)))
        })
        .transpose()
    }

    /// Write a JSON value that expires after `ttl_seconds`.
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Cannot encode value for {}: {}", key, e)))?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, json, ttl_seconds).await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    /// `SET NX EX` under `lock:<resource>`. `None` while another holder has it.
    pub async fn try_acquire_lock(
        &self,
        resource: &str,
        ttl_seconds: u64,
    ) -> AppResult<Option<LockGuard>> {
        let key = lock_key(resource);
        let token = Uuid::new_v4().to_string();
        let mut conn = self.conn.clone();

        let reply: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(&token)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await?;

        if reply.is_none() {
            return Ok(None);
        }
        tracing::debug!(resource, "Lock acquired");
        Ok(Some(LockGuard {
            conn: Some(self.conn.clone()),
            key,
            token,
        }))
    }
}

fn lock_key(resource: &str) -> String {
    format!("{}{}", CACHE_PREFIX_LOCK, resource)
}

async fn release(mut conn: ConnectionManager, key: &str, token: &str) -> Result<bool, RedisError> {
    let deleted: i32 = Script::new(RELEASE_SCRIPT)
        .key(key)
        .arg(token)
        .invoke_async(&mut conn)
        .await?;
    Ok(deleted == 1)
}

/// Held distributed lock. Dropping it releases the lock in the background;
/// the TTL covers a crash.
pub struct LockGuard {
    conn: Option<ConnectionManager>,
    key: String,
    token: String,
}

impl LockGuard {
    /// Release now and wait for Redis to confirm.
    pub async fn release(mut self) -> AppResult<()> {
        if let Some(conn) = self.conn.take() {
            if !release(conn, &self.key, &self.token).await? {
                tracing::warn!(key = %self.key, "Lock expired before release");
            }
        }
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        let key = std::mem::take(&mut self.key);
        let token = std::mem::take(&mut self.token);
        tokio::spawn(async move {
            if let Err(e) = release(conn, &key, &token).await {
                tracing::error!(key = %key, error = %e, "Failed to release lock on drop");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_key_prefix() {
        assert_eq!(lock_key("jobs:aggregate_daily_stats"), "lock:jobs:aggregate_daily_stats");
    }
}
