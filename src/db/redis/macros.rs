/// Read-through caching for an optional [`Cache`](crate::db::Cache).
///
/// With a cache present, a hit is returned directly and a miss runs `$block`,
/// queues the value for a background write, and returns it. A failed cache
/// read is logged and treated as a miss. Without a cache, `$block` simply runs.
///
/// # Arguments
/// * `$cache`: An `Option<Cache>`.
/// * `$key`: The [`CacheKey`](crate::db::CacheKey) to read and write.
/// * `$ttl`: Time-to-live of the stored value in seconds.
/// * `$block`: A future yielding `AppResult<T>`.
///
/// # Example
/// ```rust,ignore
/// let articles: Vec<NewsItem> = cached!(self.cache, CacheKey::NewsSearch(q), TTL, async move {
///     self.request_search(&q).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.as_ref() {
            Some(cache) => match cache.get_from_cache(&key).await {
                Ok(hit) => hit,
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, fetching upstream");
                    None
                }
            },
            None => None,
        };

        match hit {
            Some(cached) => Ok(cached),
            None => {
                let result: $crate::error::AppResult<_> = $block.await;
                if let (Ok(value), Some(cache)) = (&result, $cache.as_ref()) {
                    cache.set_in_background(&key, value, $ttl);
                }
                result
            }
        }
    }};
}
