/// A macro to simplify read-through caching against an in-memory cache.
///
/// This macro checks if a value is present in the cache.
/// If found, it returns the cached value.
/// If not found, it awaits the provided future to compute the value,
/// stores a copy in the cache, and then returns the computed value.
///
/// # Arguments
/// * `$cache`: The cache instance to use. It must have async `get_from_cache` and
///   `set_in_cache` methods.
/// * `$key`: The key to use for caching the value. Must implement `Clone` and `Display`.
/// * `$block`: The future to await if the value is not found in cache.
///
/// # Example
/// ```rust,ignore
/// let movie = cached!(detail_cache, movie_id, async move {
///     provider.get_movie_details(movie_id).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await {
            tracing::debug!(key = %$key, "Cache hit");
            Ok(cached)
        } else {
            tracing::debug!(key = %$key, "Cache miss");
            let value = $block.await?;
            $cache.set_in_cache($key.clone(), value.clone()).await;
            Ok(value)
        }
    }};
}
