use std::sync::Arc;

use crate::{
    db::{Cache, CacheKey},
    error::AppResult,
    models::{QuerySpec, SearchCandidate},
    services::providers::SearchIndex,
};

const SEARCH_CACHE_TTL: u64 = 86400; // 1 day

/// Read-through cache in front of a [`SearchIndex`].
///
/// Only queries carrying a cache key are cached, and only non-empty results are
/// stored, so an empty answer is always re-asked. Cache read failures count as misses.
#[derive(Clone)]
pub struct CachedSearchIndex {
    inner: Arc<dyn SearchIndex>,
    cache: Cache,
}

impl CachedSearchIndex {
    pub fn new(inner: Arc<dyn SearchIndex>, cache: Cache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait::async_trait]
impl SearchIndex for CachedSearchIndex {
    async fn search(&self, spec: &QuerySpec) -> AppResult<Vec<SearchCandidate>> {
        let Some(key) = spec.cache_key.as_ref().map(|key| CacheKey::TitleSearch {
            media_type: spec.media_type,
            key: key.clone(),
        }) else {
            return self.inner.search(spec).await;
        };

        match self.cache.get_from_cache::<Vec<SearchCandidate>>(&key).await {
            Ok(Some(hit)) => {
                tracing::debug!(key = %key, results = hit.len(), "Search cache hit");
                return Ok(hit);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(key = %key, error = %e, "Search cache read failed"),
        }

        let candidates = self.inner.search(spec).await?;
        if !candidates.is_empty() {
            self.cache.set_in_background(&key, &candidates, SEARCH_CACHE_TTL);
        }

        Ok(candidates)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
