use std::collections::HashSet;

/// Drop repeated URLs, keeping the first occurrence of each in order.
///
/// Comparison is exact string equality. Idempotent.
pub fn dedupe<I>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
