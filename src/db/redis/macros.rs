/// Read-through caching around an async block.
///
/// Returns the cached value for `$key` when present. Otherwise awaits
/// `$block`, queues the result for a background write with `$ttl` seconds,
/// and returns it. Errors from the cache lookup or the block propagate with
/// `?`, so the enclosing function must return `AppResult`.
///
/// ```rust,ignore
/// let details: TmdbMovieDetails = cached!(self.cache, CacheKey::MovieDetails(id), 3600, async {
///     self.get_json(&format!("movie/{}", id), &[]).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(hit) = $cache.get_from_cache(&key).await? {
            tracing::debug!(key = %key, "Cache hit");
            $crate::error::AppResult::Ok(hit)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            $crate::error::AppResult::Ok(value)
        }
    }};
}
