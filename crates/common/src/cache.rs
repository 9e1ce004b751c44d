//! Whole-page response cache.
//!
//! Handlers that serve cacheable pages store the rendered body under a key
//! derived from the request. Writers that change what those pages show call
//! [`PageCache::invalidate`] or [`PageCache::clear`] explicitly.
//!
//! # Backends
//!
//! - [`MemoryPageCache`]: per-process map with per-entry expiry
//! - [`RedisPageCache`]: shared across processes; `clear` bumps a generation
//!   counter so stale keys simply stop being read and expire on their own

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::{AppError, AppResult};

/// Key-value store for rendered pages.
#[async_trait]
pub trait PageCache: Send + Sync {
    /// Fetch a cached body, if present and not expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store a body for `ttl`.
    async fn set(&self, key: &str, body: &str, ttl: Duration) -> AppResult<()>;

    /// Drop a single entry.
    async fn invalidate(&self, key: &str) -> AppResult<()>;

    /// Drop every entry.
    async fn clear(&self) -> AppResult<()>;
}

/// Shared page cache handle injected into the request handlers.
pub type SharedPageCache = Arc<dyn PageCache>;

#[derive(Debug, Clone)]
struct CachedPage {
    body: String,
    expires_at: Instant,
}

/// In-process page cache.
#[derive(Clone, Default)]
pub struct MemoryPageCache {
    entries: Arc<RwLock<HashMap<String, CachedPage>>>,
}

impl MemoryPageCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl PageCache for MemoryPageCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(page) if page.expires_at > now => {
                    debug!(key = %key, "Page cache hit");
                    return Ok(Some(page.body.clone()));
                }
                Some(_) => {}
                None => {
                    debug!(key = %key, "Page cache miss");
                    return Ok(None);
                }
            }
        }

        // Expired: evict under the write lock
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|page| page.expires_at <= now) {
            entries.remove(key);
        }
        debug!(key = %key, "Page cache entry expired");
        Ok(None)
    }

    async fn set(&self, key: &str, body: &str, ttl: Duration) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, page| page.expires_at > now);
        entries.insert(
            key.to_string(),
            CachedPage {
                body: body.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.entries.write().await.clear();
        debug!("Page cache cleared");
        Ok(())
    }
}

/// Redis-backed page cache.
#[derive(Clone)]
pub struct RedisPageCache {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl RedisPageCache {
    /// Create a cache that namespaces its keys under `prefix`.
    #[must_use]
    pub fn new(redis: Arc<RedisClient>, prefix: impl Into<String>) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
        }
    }

    fn generation_key(&self) -> String {
        format!("{}:page:generation", self.prefix)
    }

    async fn generation(&self) -> AppResult<i64> {
        let generation: Option<i64> = self
            .redis
            .get(self.generation_key())
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;
        Ok(generation.unwrap_or(0))
    }

    async fn entry_key(&self, key: &str) -> AppResult<String> {
        let generation = self.generation().await?;
        Ok(format!("{}:page:{generation}:{key}", self.prefix))
    }
}

#[async_trait]
impl PageCache for RedisPageCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entry_key = self.entry_key(key).await?;
        let body: Option<String> = self
            .redis
            .get(entry_key)
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;

        if body.is_some() {
            debug!(key = %key, "Page cache hit");
        } else {
            debug!(key = %key, "Page cache miss");
        }
        Ok(body)
    }

    async fn set(&self, key: &str, body: &str, ttl: Duration) -> AppResult<()> {
        let entry_key = self.entry_key(key).await?;
        let secs = ttl.as_secs().max(1) as i64;
        self.redis
            .set::<(), _, _>(entry_key, body, Some(Expiration::EX(secs)), None, false)
            .await
            .map_err(|e| AppError::Cache(e.to_string()))
    }

    async fn invalidate(&self, key: &str) -> AppResult<()> {
        let entry_key = self.entry_key(key).await?;
        self.redis
            .del::<i64, _>(entry_key)
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        let generation: i64 = self
            .redis
            .incr(self.generation_key())
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;
        debug!(generation, "Page cache cleared");
        Ok(())
    }
}
