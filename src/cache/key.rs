//! Deterministic cache key derivation.

/// Build a cache key from a namespace (usually a provider id) and named
/// query parameters.
///
/// Parameters are sorted by name, values are lower-cased, and pairs are
/// joined as `name=value` with `&`. The same parameters in any order yield
/// the same key.
///
/// ```rust
/// # use camfeed::cache::cache_key;
/// let k1 = cache_key("a", &[("limit", "10"), ("category", "Girls")]);
/// let k2 = cache_key("a", &[("category", "girls"), ("limit", "10")]);
/// assert_eq!(k1, k2);
/// assert_eq!(k1, "a:category=girls&limit=10");
/// ```
pub fn cache_key<K, V>(namespace: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(&str, String)> = params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_ref().to_lowercase()))
        .collect();
    // Value order breaks ties so repeated names stay deterministic.
    pairs.sort();

    let joined = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{namespace}:{joined}")
}

/// Namespace part of a key produced by [`cache_key`].
pub(crate) fn namespace_of(key: &str) -> &str {
    key.split_once(':').map_or(key, |(ns, _)| ns)
}
