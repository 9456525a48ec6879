/// Read-through caching around a fallible async computation.
///
/// Returns the cached value when present. Otherwise awaits `$block`, stores its
/// result with the given TTL (in seconds) in the background and returns it.
/// Errors from the cache read or from the block are propagated with `?`.
///
/// # Example
/// ```rust,ignore
/// let trending: Vec<TrendingEntry> = cached!(self.cache, CacheKey::Trending(media_type), TTL, async move {
///     fetch_trending(media_type).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(cached) = $cache.get_from_cache(&key).await? {
            tracing::debug!(key = %key, "Cache hit");
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
