use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::{sync::Cache as MokaCache, Expiry};

use crate::error::{AppError, AppResult};
use crate::models::MediaType;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Trending(MediaType),
    TitleSearch { media_type: MediaType, key: String },
    TitleDetails(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Trending(MediaType::Movie) => write!(f, "tmdb_trending_movies"),
            CacheKey::Trending(MediaType::Tv) => write!(f, "tmdb_trending_tv"),
            CacheKey::TitleSearch { media_type, key } => {
                write!(f, "imdb_{}_search_{}", media_type, key)
            }
            CacheKey::TitleDetails(imdb_id) => write!(f, "imdb_title_{}", imdb_id),
        }
    }
}

/// Raw key/value backend behind [`Cache`]
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> AppResult<Option<String>>;

    /// Stores a value without waiting for the write to land
    fn set_raw_in_background(&self, key: String, value: String, ttl: u64);

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Typed JSON cache handle shared by the providers
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Cache backed by a process-local [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    /// Retrieves a value from the cache by key
    ///
    /// If the key exists in the cache, the value is deserialized and returned.
    /// If the key does not exist, `None` is returned.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        match self.store.get_raw(&key.to_string()).await? {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value in the cache asynchronously without blocking
    ///
    /// Serialization failures are logged and the write is dropped.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        self.store.set_raw_in_background(key.to_string(), json, ttl);
    }
}

/// Upper bound on entries held by a [`MemoryStore`]
const MEMORY_CACHE_CAPACITY: u64 = 50_000;

#[derive(Clone)]
struct MemoryEntry {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with
struct PerEntryTtl;

impl Expiry<String, MemoryEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &MemoryEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &MemoryEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Process-local store used when no Redis is configured
///
/// Backed by moka, so expired entries are evicted by the cache's own housekeeping
/// and the entry count is bounded.
pub struct MemoryStore {
    entries: MokaCache<String, MemoryEntry>,
}

impl MemoryStore {
    pub fn with_capacity(max_entries: u64) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();

        Self { entries }
    }

    /// Number of live entries after pending evictions have run
    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_capacity(MEMORY_CACHE_CAPACITY)
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryStore {
    async fn get_raw(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value))
    }

    fn set_raw_in_background(&self, key: String, value: String, ttl: u64) {
        self.entries.insert(
            key,
            MemoryEntry {
                value,
                ttl: Duration::from_secs(ttl),
            },
        );
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
